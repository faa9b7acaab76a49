//! HTML pages of the dashboard
//!
//! A single handlebars template renders both the empty form and the
//! results of a submission. Handlebars escapes every `{{value}}`.

use chrono::{NaiveDateTime, Timelike};
use handlebars::Handlebars;
use serde::Serialize;

use crate::flow::SubmissionOutcome;
use crate::i18n::t;
use crate::models::{Country, RankedQuery, Timeframe};
use crate::normalize::QueryForm;

/// Name the page template is registered under
pub const PAGE: &str = "page";

const PAGE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="{{lang}}">
<head>
  <meta charset="utf-8">
  <title>{{text.title}}</title>
  <style>
    body { font-family: sans-serif; max-width: 860px; margin: 2rem auto; padding: 0 1rem; }
    label { display: block; margin-top: 1rem; }
    input, select { width: 100%; padding: .4rem; }
    button { margin-top: 1rem; padding: .5rem 1rem; }
    .banner { padding: .75rem; margin: 1rem 0; border-radius: 4px; }
    .success { background: #e6f4ea; }
    .error { background: #fce8e6; }
    .info { background: #e8f0fe; }
    table { border-collapse: collapse; margin: 1rem 0; }
    th, td { border: 1px solid #ccc; padding: .25rem .5rem; text-align: right; }
    th:first-child, td:first-child { text-align: left; }
    img { max-width: 100%; }
  </style>
</head>
<body>
  <h1>{{text.title}}</h1>
  <p>{{text.subtitle}}</p>

  <form method="post" action="/query" onsubmit="var b = this.querySelector('button'); b.disabled = true; b.textContent = b.dataset.working;">
    <label for="keywords">{{text.keywords}}</label>
    <input id="keywords" name="keywords" value="{{form.keywords}}">

    <label for="country">{{text.country}}</label>
    <select id="country" name="country">
      {{#each form.countries}}<option value="{{value}}"{{#if selected}} selected{{/if}}>{{value}}</option>{{/each}}
    </select>

    <label for="timeframe">{{text.timeframe}}</label>
    <select id="timeframe" name="timeframe">
      {{#each form.timeframes}}<option value="{{value}}"{{#if selected}} selected{{/if}}>{{value}}</option>{{/each}}
    </select>

    <label for="region">{{text.region}}</label>
    <input id="region" name="region" value="{{form.region}}">

    <button type="submit" data-working="{{text.working}}">{{text.submit}}</button>
  </form>

  {{#if banner}}<div class="banner {{banner.kind}}">{{banner.message}}</div>{{/if}}

  {{#if results}}
  <h2>{{text.table_heading}}</h2>
  <table>
    <thead><tr><th>{{text.date}}</th>{{#each results.columns}}<th>{{this}}</th>{{/each}}</tr></thead>
    <tbody>
      {{#each results.rows}}<tr><td>{{date}}</td>{{#each values}}<td>{{this}}</td>{{/each}}</tr>
      {{/each}}
    </tbody>
  </table>

  <img src="{{results.chart_src}}" alt="{{results.chart_alt}}">

  <p>
    {{#each results.downloads}}<a href="{{href}}" download>{{label}}</a><br>{{/each}}
  </p>

  <h2>{{text.related_heading}}</h2>
  {{#each results.related}}
  <h3>{{heading}}</h3>
  <table>
    <thead><tr><th>{{@root.text.related_query}}</th><th>{{@root.text.related_value}}</th></tr></thead>
    <tbody>
      {{#each rows}}<tr><td>{{query}}</td><td>{{value}}</td></tr>{{/each}}
    </tbody>
  </table>
  {{else}}
  <p>{{@root.text.related_none}}</p>
  {{/each}}
  {{/if}}
</body>
</html>
"#;

/// Register all dashboard templates
pub fn registry() -> Result<Handlebars<'static>, handlebars::TemplateError> {
    let mut handlebars = Handlebars::new();
    handlebars.register_template_string(PAGE, PAGE_TEMPLATE)?;
    Ok(handlebars)
}

/// Localized static text of the page
#[derive(Debug, Serialize)]
pub struct PageText {
    title: String,
    subtitle: String,
    keywords: String,
    country: String,
    timeframe: String,
    region: String,
    submit: String,
    working: String,
    table_heading: String,
    date: String,
    related_heading: String,
    related_query: String,
    related_value: String,
    related_none: String,
}

impl PageText {
    fn for_locale(locale: &str) -> Self {
        Self {
            title: t!("app.title", locale = locale).to_string(),
            subtitle: t!("app.subtitle", locale = locale).to_string(),
            keywords: t!("form.keywords", locale = locale).to_string(),
            country: t!("form.country", locale = locale).to_string(),
            timeframe: t!("form.timeframe", locale = locale).to_string(),
            region: t!("form.region", locale = locale).to_string(),
            submit: t!("form.submit", locale = locale).to_string(),
            working: t!("form.working", locale = locale).to_string(),
            table_heading: t!("table.heading", locale = locale).to_string(),
            date: t!("table.date", locale = locale).to_string(),
            related_heading: t!("related.heading", locale = locale).to_string(),
            related_query: t!("related.query", locale = locale).to_string(),
            related_value: t!("related.value", locale = locale).to_string(),
            related_none: t!("related.none", locale = locale).to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct OptionItem {
    value: &'static str,
    selected: bool,
}

#[derive(Debug, Serialize)]
struct FormContext {
    keywords: String,
    region: String,
    countries: Vec<OptionItem>,
    timeframes: Vec<OptionItem>,
}

impl From<&QueryForm> for FormContext {
    fn from(form: &QueryForm) -> Self {
        Self {
            keywords: form.keywords.clone(),
            region: form.region.clone(),
            countries: Country::ALL
                .iter()
                .map(|c| OptionItem {
                    value: c.code(),
                    selected: *c == form.country,
                })
                .collect(),
            timeframes: Timeframe::ALL
                .iter()
                .map(|tf| OptionItem {
                    value: tf.as_str(),
                    selected: *tf == form.timeframe,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
struct Banner {
    kind: &'static str,
    message: String,
}

#[derive(Debug, Serialize)]
struct RowContext {
    date: String,
    values: Vec<u32>,
}

#[derive(Debug, Serialize)]
struct LinkContext {
    label: String,
    href: String,
}

#[derive(Debug, Serialize)]
struct RelatedContext {
    heading: String,
    rows: Vec<RankedQuery>,
}

#[derive(Debug, Serialize)]
struct ResultsContext {
    columns: Vec<String>,
    rows: Vec<RowContext>,
    chart_src: String,
    chart_alt: String,
    downloads: Vec<LinkContext>,
    related: Vec<RelatedContext>,
}

/// Data behind one rendering of the page
#[derive(Debug, Serialize)]
pub struct PageContext {
    lang: &'static str,
    text: PageText,
    form: FormContext,
    banner: Option<Banner>,
    results: Option<ResultsContext>,
}

/// Link target of a download
pub fn download_href(filename: &str) -> String {
    format!("/download/{filename}")
}

fn display_date(date: &NaiveDateTime) -> String {
    if date.num_seconds_from_midnight() == 0 {
        date.format("%Y-%m-%d").to_string()
    } else {
        date.format("%Y-%m-%d %H:%M").to_string()
    }
}

impl PageContext {
    /// Page with the form only
    pub fn form(locale: &'static str, form: &QueryForm) -> Self {
        Self {
            lang: locale,
            text: PageText::for_locale(locale),
            form: FormContext::from(form),
            banner: None,
            results: None,
        }
    }

    /// Page with a plain banner, e.g. a rejected submission
    pub fn with_message(locale: &'static str, form: &QueryForm, kind: &'static str, message: String) -> Self {
        Self {
            banner: Some(Banner { kind, message }),
            ..Self::form(locale, form)
        }
    }

    /// Page showing the outcome of a submission
    pub fn outcome(locale: &'static str, form: &QueryForm, outcome: &SubmissionOutcome) -> Self {
        let mut page = Self::form(locale, form);

        match outcome {
            SubmissionOutcome::NoData { message, .. } => {
                page.banner = Some(Banner {
                    kind: "error",
                    message: message.clone(),
                });
            }
            SubmissionOutcome::Failed { message, .. } => {
                page.banner = Some(Banner {
                    kind: "error",
                    message: message.clone(),
                });
            }
            SubmissionOutcome::Presented(presentation) => {
                page.banner = Some(Banner {
                    kind: "success",
                    message: t!("flow.success", locale = locale).to_string(),
                });

                let view = &presentation.view;
                page.results = Some(ResultsContext {
                    columns: view.columns.clone(),
                    rows: view
                        .rows
                        .iter()
                        .map(|r| RowContext {
                            date: display_date(&r.date),
                            values: r.values.clone(),
                        })
                        .collect(),
                    // Cache-busting query so the browser fetches the new chart
                    chart_src: format!(
                        "{}?rows={}",
                        download_href(presentation.png.filename),
                        presentation.table.len()
                    ),
                    chart_alt: presentation.chart.title.clone(),
                    downloads: [&presentation.png, &presentation.csv]
                        .into_iter()
                        .map(|d| LinkContext {
                            label: d.label.clone(),
                            href: download_href(d.filename),
                        })
                        .collect(),
                    related: presentation
                        .related
                        .iter()
                        .map(|r| RelatedContext {
                            heading: t!("related.keyword", locale = locale, keyword = r.keyword)
                                .to_string(),
                            rows: r.top.clone(),
                        })
                        .collect(),
                });
            }
        }

        page
    }
}
