//! Render pipeline: template + test case → [`RenderOutcome`].
//!
//! Two failure channels are kept apart:
//!
//! - engine faults (syntax, undefined access, type errors) abort the render
//! - `raise_exception(...)` calls are collected by a [`DiagnosticSink`] and
//!   downgrade an otherwise successful render to an error
//!
//! Every render builds a fresh environment and re-reads the template from
//! disk, so edits are visible on the next request.

mod context;
mod diagnostics;

#[cfg(test)]
mod tests;

use std::path::Path;

use minijinja::{Environment, UndefinedBehavior};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use context::RenderContext;
pub use diagnostics::DiagnosticSink;

use crate::config::RenderConfig;
use crate::fixtures::Fixtures;
use crate::store::{StoreError, TemplateStore};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("UnknownTestCase: no test case named `{0}`")]
    UnknownTestCase(String),

    #[error("{}: {}", .0.kind(), .0)]
    Template(#[from] StoreError),

    #[error("{kind}: {message}")]
    EngineFault { kind: String, message: String },

    #[error("Template raised {} diagnostic(s): {}", .0.len(), .0.join("\n"))]
    DiagnosticRaised(Vec<String>),
}

impl From<minijinja::Error> for RenderError {
    fn from(err: minijinja::Error) -> Self {
        let mut message = err
            .detail()
            .map(str::to_string)
            .unwrap_or_else(|| err.kind().to_string());
        if let (Some(name), Some(line)) = (err.name(), err.line()) {
            message.push_str(&format!(" (in {name}:{line})"));
        }
        Self::EngineFault {
            kind: format!("{:?}", err.kind()),
            message,
        }
    }
}

/// Caller overrides merged into the context last.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub add_generation_prompt: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub add_system_prompt: Option<bool>,
}

/// One render call, as sent by the editor (`filepath`/`test_case` accepted).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderRequest {
    #[serde(alias = "filepath")]
    pub template_path: String,
    #[serde(alias = "test_case")]
    pub test_case_name: String,
    #[serde(flatten)]
    pub options: RenderOptions,
}

impl RenderRequest {
    pub fn new(template_path: impl Into<String>, test_case_name: impl Into<String>) -> Self {
        Self {
            template_path: template_path.into(),
            test_case_name: test_case_name.into(),
            options: RenderOptions::default(),
        }
    }

    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }
}

/// Exactly one of `content` and `error` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderOutcome {
    pub content: Option<String>,
    pub error: Option<String>,
}

impl RenderOutcome {
    pub fn success(content: String) -> Self {
        Self {
            content: Some(content),
            error: None,
        }
    }

    pub fn failure(error: impl std::fmt::Display) -> Self {
        Self {
            content: None,
            error: Some(error.to_string()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

impl From<Result<String, RenderError>> for RenderOutcome {
    fn from(result: Result<String, RenderError>) -> Self {
        match result {
            Ok(content) => Self::success(content),
            Err(err) => Self::failure(err),
        }
    }
}

/// Borrowing view over what a render needs.
pub struct Renderer<'a> {
    templates: &'a TemplateStore,
    fixtures: &'a Fixtures,
    config: &'a RenderConfig,
}

impl<'a> Renderer<'a> {
    pub fn new(templates: &'a TemplateStore, fixtures: &'a Fixtures, config: &'a RenderConfig) -> Self {
        Self {
            templates,
            fixtures,
            config,
        }
    }

    /// Render, folding every failure into the outcome.
    pub fn render(&self, request: &RenderRequest) -> RenderOutcome {
        let outcome = RenderOutcome::from(self.try_render(request));
        if let Some(err) = &outcome.error {
            crate::debug!("render"; "{} / {}: {}", request.template_path, request.test_case_name, err);
        }
        outcome
    }

    pub fn try_render(&self, request: &RenderRequest) -> Result<String, RenderError> {
        let case = self
            .fixtures
            .get(&request.test_case_name)
            .ok_or_else(|| RenderError::UnknownTestCase(request.test_case_name.clone()))?;

        let name = self.template_name(&request.template_path)?;
        let artifact = self.templates.read(&name)?;

        let sink = DiagnosticSink::default();
        let context = RenderContext::build(
            case,
            self.fixtures.tokens(),
            &request.options,
            &self.config.system_prompt,
            &sink,
        );

        let mut env = self.environment();
        env.add_template_owned(name.clone(), artifact.content)?;
        let rendered = env.get_template(&name)?.render(context.into_value())?;

        let diagnostics = sink.take();
        if !diagnostics.is_empty() {
            return Err(RenderError::DiagnosticRaised(diagnostics));
        }
        Ok(rendered)
    }

    /// Root-relative name; absolute paths under the root are accepted too.
    fn template_name(&self, template_path: &str) -> Result<String, StoreError> {
        let path = Path::new(template_path);
        if !path.is_absolute() {
            return Ok(template_path.to_string());
        }
        self.templates
            .relative(path)
            .ok_or_else(|| StoreError::NotFound(path.to_path_buf()))
    }

    fn environment(&self) -> Environment<'static> {
        let mut env = Environment::new();
        env.set_loader(minijinja::path_loader(self.templates.root()));
        env.set_unknown_method_callback(minijinja_contrib::pycompat::unknown_method_callback);
        env.set_trim_blocks(self.config.trim_blocks);
        env.set_lstrip_blocks(self.config.lstrip_blocks);
        if self.config.strict_undefined {
            env.set_undefined_behavior(UndefinedBehavior::Strict);
        }
        env
    }
}
