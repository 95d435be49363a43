//! Built-in text for generated artifacts.
//!
//! Placeholders use `{{VARIABLE}}` syntax and are filled by
//! `RenderContext::render`.

use kiln_core::domain::{CiProvider, Language};

pub(crate) fn module_stub(language: Language) -> &'static str {
    match language {
        Language::Rust => {
            "//! {{MODULE_NAME}} module of {{PROJECT_NAME}}.\n\
             //!\n\
             //! Depends on: {{DEPENDENCIES}}\n\
             \n\
             /// Entry hook called from the binary.\n\
             pub fn init() {}\n"
        }
        Language::TypeScript => {
            "// {{MODULE_NAME}} module of {{PROJECT_NAME}}.\n\
             // Depends on: {{DEPENDENCIES}}\n\
             \n\
             export function init(): void {}\n"
        }
        Language::Python => {
            "\"\"\"{{MODULE_NAME}} module of {{PROJECT_NAME}}.\n\
             \n\
             Depends on: {{DEPENDENCIES}}\n\
             \"\"\"\n\
             \n\
             \n\
             def init() -> None:\n    \
                 pass\n"
        }
        Language::Go => {
            "// {{MODULE_NAME}} module of {{PROJECT_NAME}}.\n\
             // Depends on: {{DEPENDENCIES}}\n\
             package main\n\
             \n\
             func init{{MODULE_NAME_PASCAL}}() {}\n"
        }
    }
}

pub(crate) fn test_stub(language: Language) -> &'static str {
    match language {
        Language::Rust => {
            "#[test]\n\
             fn {{MODULE_NAME_SNAKE}}_initialises() {\n    \
                 // Smoke test for the {{MODULE_NAME}} module.\n    \
                 assert!(true);\n\
             }\n"
        }
        Language::TypeScript => {
            "import { init } from \"../src/{{MODULE_NAME_SNAKE}}\";\n\
             \n\
             test(\"{{MODULE_NAME}} initialises\", () => {\n  \
                 expect(() => init()).not.toThrow();\n\
             });\n"
        }
        Language::Python => {
            "from src import {{MODULE_NAME_SNAKE}}\n\
             \n\
             \n\
             def test_{{MODULE_NAME_SNAKE}}_initialises() -> None:\n    \
                 {{MODULE_NAME_SNAKE}}.init()\n"
        }
        Language::Go => {
            "package main\n\
             \n\
             import \"testing\"\n\
             \n\
             func Test{{MODULE_NAME_PASCAL}}Initialises(t *testing.T) {\n\t\
                 init{{MODULE_NAME_PASCAL}}()\n\
             }\n"
        }
    }
}

pub(crate) fn gitignore(language: Language) -> &'static str {
    match language {
        Language::Rust => "/target\n.env\n",
        Language::TypeScript => "node_modules/\ndist/\n.env\n",
        Language::Python => "__pycache__/\n.venv/\n*.pyc\n.env\n",
        Language::Go => "/bin\n.env\n",
    }
}

pub(crate) const EDITORCONFIG: &str = "root = true\n\
\n\
[*]\n\
charset = utf-8\n\
end_of_line = lf\n\
insert_final_newline = true\n\
indent_style = space\n\
indent_size = 4\n\
\n\
[*.{yml,yaml,json,ts}]\n\
indent_size = 2\n";

pub(crate) fn dockerfile(language: Language) -> &'static str {
    match language {
        Language::Rust => {
            "FROM rust:1.85 AS build\n\
             WORKDIR /app\n\
             COPY . .\n\
             RUN cargo build --release\n\
             \n\
             FROM debian:bookworm-slim\n\
             COPY --from=build /app/target/release/{{PROJECT_NAME_KEBAB}} /usr/local/bin/app\n\
             CMD [\"app\"]\n"
        }
        Language::TypeScript => {
            "FROM node:22-alpine\n\
             WORKDIR /app\n\
             COPY package.json .\n\
             RUN npm install\n\
             COPY . .\n\
             CMD [\"npm\", \"start\"]\n"
        }
        Language::Python => {
            "FROM python:3.12-slim\n\
             WORKDIR /app\n\
             COPY . .\n\
             RUN pip install .\n\
             CMD [\"python\", \"src/main.py\"]\n"
        }
        Language::Go => {
            "FROM golang:1.22 AS build\n\
             WORKDIR /app\n\
             COPY . .\n\
             RUN go build -o /app/bin/app .\n\
             \n\
             FROM gcr.io/distroless/base\n\
             COPY --from=build /app/bin/app /app\n\
             CMD [\"/app\"]\n"
        }
    }
}

pub(crate) const COMPOSE: &str = "services:\n  \
  {{PROJECT_NAME_KEBAB}}:\n    \
    build:\n      \
      context: ..\n      \
      dockerfile: Dockerfile\n";

pub(crate) fn ci_workflow(provider: CiProvider, language: Language) -> String {
    let (image, command) = match language {
        Language::Rust => ("rust:1.85", "cargo test"),
        Language::TypeScript => ("node:22", "npm ci && npm test"),
        Language::Python => ("python:3.12", "pip install . pytest && pytest"),
        Language::Go => ("golang:1.22", "go test ./..."),
    };

    match provider {
        CiProvider::GitHub => format!(
            "name: ci\n\
             on: [push, pull_request]\n\
             jobs:\n  \
               test:\n    \
                 runs-on: ubuntu-latest\n    \
                 container: {image}\n    \
                 steps:\n      \
                   - uses: actions/checkout@v4\n      \
                   - run: {command}\n"
        ),
        CiProvider::GitLab => format!(
            "test:\n  \
               image: {image}\n  \
               script:\n    \
                 - {command}\n"
        ),
        CiProvider::CircleCi => format!(
            "version: 2.1\n\
             jobs:\n  \
               test:\n    \
                 docker:\n      \
                   - image: {image}\n    \
                 steps:\n      \
                   - checkout\n      \
                   - run: {command}\n\
             workflows:\n  \
               main:\n    \
                 jobs: [test]\n"
        ),
    }
}
