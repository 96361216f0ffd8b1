use minijinja::value::Value as TemplateValue;
use minijinja::{AutoEscape, Environment, context};

use crate::error::RenderError;
use crate::form::Form;
use crate::widget::{Control, SubmitControl, Widget, WidgetRenderer};

const FIELD_TEMPLATE: &str = include_str!("../templates/field.html.j2");
const FORM_TEMPLATE: &str = include_str!("../templates/form.html.j2");

/// Renders a form to static HTML, for previews.
pub struct HtmlRenderer {
    env: Environment<'static>,
    title: Option<String>,
    fields: Vec<String>,
    error: Option<String>,
    submit: Option<SubmitControl>,
    failure: Option<minijinja::Error>,
}

impl HtmlRenderer {
    pub fn new() -> Result<Self, RenderError> {
        let mut env = Environment::new();
        env.set_auto_escape_callback(|_| AutoEscape::Html);
        env.add_template("field.html", FIELD_TEMPLATE)?;
        env.add_template("form.html", FORM_TEMPLATE)?;
        Ok(Self {
            env,
            title: None,
            fields: Vec::new(),
            error: None,
            submit: None,
            failure: None,
        })
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    fn render_field(&self, widget: &Widget<'_>) -> Result<String, minijinja::Error> {
        let input_type = match &widget.control {
            Control::Input { affordance, .. } => affordance.html_type(),
            Control::Number { .. } => "number",
            _ => "text",
        };
        self.env
            .get_template("field.html")?
            .render(context! { widget => widget, input_type => input_type })
    }

    /// Assemble the collected parts into one document.
    pub fn finish(self) -> Result<String, RenderError> {
        if let Some(err) = self.failure {
            return Err(err.into());
        }
        let submit = self.submit.unwrap_or(SubmitControl {
            label: "Save".to_string(),
            disabled: false,
        });
        let html = self.env.get_template("form.html")?.render(context! {
            title => self.title,
            body => TemplateValue::from_safe_string(self.fields.join("\n")),
            error => self.error,
            submit => submit,
        })?;
        Ok(html)
    }
}

impl WidgetRenderer for HtmlRenderer {
    fn field(&mut self, widget: &Widget<'_>) {
        if self.failure.is_some() {
            return;
        }
        match self.render_field(widget) {
            Ok(html) => self.fields.push(html),
            Err(err) => self.failure = Some(err),
        }
    }

    fn error(&mut self, message: &str) {
        self.error = Some(message.to_string());
    }

    fn submit(&mut self, control: &SubmitControl) {
        self.submit = Some(control.clone());
    }
}

/// Render `form` as an HTML fragment.
pub fn render_form(form: &Form, title: Option<&str>) -> Result<String, RenderError> {
    let mut renderer = HtmlRenderer::new()?;
    if let Some(title) = title {
        renderer = renderer.with_title(title);
    }
    form.render(&mut renderer);
    renderer.finish()
}
