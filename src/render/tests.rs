use std::fs;
use std::path::Path;

use tempfile::TempDir;

use super::*;

const CHATML: &str = "{{ bos_token }}{% for m in messages %}<|{{ m.role }}|>{{ m.content }}\n{% endfor %}{% if add_generation_prompt %}<|assistant|>{% endif %}";

const ALTERNATION: &str = "{%- for m in messages -%}\
{%- if loop.index0 > 0 and messages[loop.index0 - 1].role == m.role -%}\
{{ raise_exception('Conversation roles must alternate user/assistant/user/assistant/...') }}\
{%- endif -%}\
{{ m.content }}\n\
{%- endfor -%}";

struct Fixture {
    _temp: TempDir,
    store: TemplateStore,
    fixtures: Fixtures,
    config: RenderConfig,
}

impl Fixture {
    fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("templates");
        fs::create_dir_all(&root).unwrap();
        Self {
            store: TemplateStore::new(root),
            _temp: temp,
            fixtures: Fixtures::builtin(),
            config: RenderConfig::default(),
        }
    }

    fn write(&self, name: &str, content: &str) {
        let path = self.store.root().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    fn render(&self, request: &RenderRequest) -> RenderOutcome {
        Renderer::new(&self.store, &self.fixtures, &self.config).render(request)
    }
}

#[test]
fn test_plain_render() {
    let fx = Fixture::new();
    fx.write("chatml.jinja", CHATML);

    let outcome = fx.render(&RenderRequest::new("chatml.jinja", "no sys"));
    assert_eq!(
        outcome,
        RenderOutcome::success(
            "BOS_<|user|>Hello!\n<|assistant|>Hello! How can I help you today?\n".into()
        )
    );
}

#[test]
fn test_render_is_deterministic() {
    let fx = Fixture::new();
    fx.write("chatml.jinja", CHATML);
    let request = RenderRequest::new("chatml.jinja", "basic");

    let first = fx.render(&request);
    let second = fx.render(&request);
    assert!(first.is_ok());
    assert_eq!(first, second);
}

#[test]
fn test_options_override_context() {
    let fx = Fixture::new();
    fx.write("chatml.jinja", CHATML);

    let request = RenderRequest::new("chatml.jinja", "empty").with_options(RenderOptions {
        add_generation_prompt: Some(true),
        add_system_prompt: Some(true),
    });
    let outcome = fx.render(&request);
    assert_eq!(
        outcome.content.as_deref(),
        Some("BOS_<|system|>You are a helpful AI\n<|assistant|>")
    );

    // The stored case is untouched.
    assert!(fx.fixtures.get("empty").unwrap().messages.is_empty());
    let plain = fx.render(&RenderRequest::new("chatml.jinja", "empty"));
    assert_eq!(plain.content.as_deref(), Some("BOS_"));
}

#[test]
fn test_double_user_raises_one_diagnostic() {
    let fx = Fixture::new();
    fx.write("alt.jinja", ALTERNATION);

    let outcome = fx.render(&RenderRequest::new("alt.jinja", "double user"));
    assert!(outcome.content.is_none());
    let error = outcome.error.unwrap();
    assert!(error.starts_with("Template raised 1 diagnostic(s): "), "{error}");
    assert!(error.contains("Conversation roles must alternate"));

    let clean = fx.render(&RenderRequest::new("alt.jinja", "user last"));
    assert!(clean.is_ok(), "{:?}", clean.error);
}

#[test]
fn test_diagnostics_accumulate() {
    let fx = Fixture::new();
    fx.write(
        "twice.jinja",
        "{{ raise_exception('first problem') }}after{{ raise_exception('second problem') }}",
    );

    let outcome = fx.render(&RenderRequest::new("twice.jinja", "basic"));
    assert!(outcome.content.is_none());
    let error = outcome.error.unwrap();
    assert!(error.contains('2'));
    assert!(error.contains("first problem\nsecond problem"));
}

#[test]
fn test_fresh_sink_per_render() {
    let fx = Fixture::new();
    fx.write(
        "cond.jinja",
        "{% if messages|length == 0 %}{{ raise_exception('empty') }}{% endif %}ok",
    );

    assert!(!fx.render(&RenderRequest::new("cond.jinja", "empty")).is_ok());
    let outcome = fx.render(&RenderRequest::new("cond.jinja", "basic"));
    assert_eq!(outcome.content.as_deref(), Some("ok"));
}

#[test]
fn test_syntax_error_is_engine_fault() {
    let fx = Fixture::new();
    fx.write("broken.jinja", "{% for m in messages %}{{ m.content }}");

    let outcome = fx.render(&RenderRequest::new("broken.jinja", "basic"));
    assert!(outcome.content.is_none());
    assert!(outcome.error.unwrap().starts_with("SyntaxError: "));
}

#[test]
fn test_undefined_attribute_is_engine_fault() {
    let fx = Fixture::new();
    fx.write("undef.jinja", "{{ nothing.here }}");

    let outcome = fx.render(&RenderRequest::new("undef.jinja", "basic"));
    assert!(outcome.error.unwrap().starts_with("UndefinedError: "));
}

#[test]
fn test_strict_undefined() {
    let mut fx = Fixture::new();
    fx.write("loose.jinja", "[{{ missing }}]");

    let lenient = fx.render(&RenderRequest::new("loose.jinja", "basic"));
    assert_eq!(lenient.content.as_deref(), Some("[]"));

    fx.config.strict_undefined = true;
    let strict = fx.render(&RenderRequest::new("loose.jinja", "basic"));
    assert!(strict.error.unwrap().starts_with("UndefinedError: "));
}

#[test]
fn test_unknown_test_case() {
    let fx = Fixture::new();
    fx.write("chatml.jinja", CHATML);

    let outcome = fx.render(&RenderRequest::new("chatml.jinja", "nope"));
    assert!(outcome.content.is_none());
    assert!(outcome.error.unwrap().starts_with("UnknownTestCase: "));
}

#[test]
fn test_missing_template() {
    let fx = Fixture::new();
    let outcome = fx.render(&RenderRequest::new("absent.jinja", "basic"));
    assert!(outcome.error.unwrap().starts_with("NotFound: "));

    let escape = fx.render(&RenderRequest::new("../secret.jinja", "basic"));
    assert!(escape.error.unwrap().starts_with("NotFound: "));
}

#[test]
fn test_edits_visible_without_restart() {
    let fx = Fixture::new();
    fx.write("live.jinja", "v1");
    let request = RenderRequest::new("live.jinja", "basic");
    assert_eq!(fx.render(&request).content.as_deref(), Some("v1"));

    fx.write("live.jinja", "v2");
    assert_eq!(fx.render(&request).content.as_deref(), Some("v2"));
}

#[test]
fn test_absolute_template_path() {
    let fx = Fixture::new();
    fx.write("nested/abs.jinja", "{{ eos_token }}");
    let path = fx.store.root().join("nested/abs.jinja");

    let outcome = fx.render(&RenderRequest::new(path.to_string_lossy(), "basic"));
    assert_eq!(outcome.content.as_deref(), Some("_EOS"));

    let outside = fx.render(&RenderRequest::new("/elsewhere/x.jinja", "basic"));
    assert!(!outside.is_ok());
}

#[test]
fn test_include_resolves_against_root() {
    let fx = Fixture::new();
    fx.write("parts/turn.jinja", "<{{ m.role }}>");
    fx.write(
        "main.jinja",
        "{% for m in messages %}{% include 'parts/turn.jinja' %}{% endfor %}",
    );

    let outcome = fx.render(&RenderRequest::new("main.jinja", "no sys"));
    assert_eq!(outcome.content.as_deref(), Some("<user><assistant>"));
}

#[test]
fn test_helpers_available() {
    let fx = Fixture::new();
    fx.write(
        "helpers.jinja",
        "{{ strftime_now('%Y')|length }}|{{ '  hi  '.strip() }}|{{ tools_json|length > 0 }}",
    );

    let outcome = fx.render(&RenderRequest::new("helpers.jinja", "tools"));
    assert_eq!(outcome.content.as_deref(), Some("4|hi|True"));
}

#[test]
fn test_request_accepts_editor_field_names() {
    let request: RenderRequest = serde_json::from_str(
        r#"{"filepath": "a.jinja", "test_case": "basic", "add_generation_prompt": true}"#,
    )
    .unwrap();
    assert_eq!(request.template_path, "a.jinja");
    assert_eq!(request.test_case_name, "basic");
    assert_eq!(request.options.add_generation_prompt, Some(true));
    assert_eq!(request.options.add_system_prompt, None);
    assert!(Path::new(&request.template_path).is_relative());
}
