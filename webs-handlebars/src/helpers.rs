//! Helpers registered on every template set

use handlebars::{
    Context, Handlebars, Helper, HelperResult, JsonRender, Output, RenderContext, RenderError,
};

/// Register all built-in helpers
pub fn register_builtin_helpers(handlebars: &mut Handlebars) {
    handlebars.register_helper("eq", Box::new(eq_helper));
    handlebars.register_helper("default", Box::new(default_helper));
    handlebars.register_helper("upper", Box::new(upper_helper));
}

fn is_blank(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => true,
        serde_json::Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// Equal comparison helper: {{#if (eq a b)}}
fn eq_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let left = h.param(0).ok_or_else(|| RenderError::new("eq requires 2 parameters"))?;
    let right = h.param(1).ok_or_else(|| RenderError::new("eq requires 2 parameters"))?;

    if left.value() == right.value() {
        out.write("true")?;
    }
    Ok(())
}

/// Fallback for missing or empty values: {{default name "stranger"}}
fn default_helper(
    h: &Helper,
    r: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let fallback = h
        .param(1)
        .ok_or_else(|| RenderError::new("default requires 2 parameters"))?;

    let value = match h.param(0) {
        Some(param) if !is_blank(param.value()) => param.value(),
        _ => fallback.value(),
    };
    out.write(&r.get_escape_fn()(&value.render()))?;
    Ok(())
}

/// {{upper message}}
fn upper_helper(
    h: &Helper,
    r: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    let param = h.param(0).ok_or_else(|| RenderError::new("upper requires 1 parameter"))?;
    out.write(&r.get_escape_fn()(&param.value().render().to_uppercase()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn registry() -> Handlebars<'static> {
        let mut handlebars = Handlebars::new();
        register_builtin_helpers(&mut handlebars);
        handlebars
    }

    #[test]
    fn test_eq() {
        let hb = registry();
        let out = hb
            .render_template("{{#if (eq a b)}}same{{else}}different{{/if}}", &json!({"a": 1, "b": 1}))
            .unwrap();
        assert_eq!(out, "same");

        let out = hb
            .render_template("{{#if (eq a b)}}same{{else}}different{{/if}}", &json!({"a": 1, "b": 2}))
            .unwrap();
        assert_eq!(out, "different");
    }

    #[test]
    fn test_default() {
        let hb = registry();
        let template = r#"Hello {{default name "stranger"}}"#;
        assert_eq!(hb.render_template(template, &json!({})).unwrap(), "Hello stranger");
        assert_eq!(hb.render_template(template, &json!({"name": ""})).unwrap(), "Hello stranger");
        assert_eq!(hb.render_template(template, &json!({"name": "Ann"})).unwrap(), "Hello Ann");
    }

    #[test]
    fn test_helper_output_is_escaped() {
        let hb = registry();
        assert_eq!(
            hb.render_template(r#"{{default name "x"}}"#, &json!({"name": "<b>"})).unwrap(),
            "&lt;b&gt;"
        );
    }

    #[test]
    fn test_upper() {
        let hb = registry();
        assert_eq!(
            hb.render_template("{{upper message}}", &json!({"message": "hi there"})).unwrap(),
            "HI THERE"
        );
    }
}
