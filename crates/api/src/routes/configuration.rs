//! Registry introspection endpoint.

use std::sync::Arc;

use axum::extract::State;
use axum::response::Html;
use composer::ImplementorSet;

use crate::routes::AppState;

/// GET /composer/configuration: HTML table of every request/response pair
/// and the participators registered for it.
pub async fn show(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(render(&state.registry().describe(), &state.text_filters))
}

/// Renders the table, removing every `filters` entry from the type names.
fn render(sets: &[ImplementorSet], filters: &[String]) -> String {
    let name = |raw: &str| escape(&strip(raw, filters));

    let mut html = String::from(
        "<!DOCTYPE html>\n<html>\n<head><title>Composer configuration</title></head>\n<body>\n\
         <table>\n<tr><th>Request</th><th>Response</th><th>Participators</th></tr>\n",
    );

    for set in sets {
        let participators = if set.participators.is_empty() {
            "<em>NO IMPLEMENTATIONS</em>".to_string()
        } else {
            set.participators
                .iter()
                .map(|participator| name(*participator))
                .collect::<Vec<_>>()
                .join("<br>")
        };
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            name(set.request),
            name(set.response),
            participators
        ));
    }

    html.push_str("</table>\n</body>\n</html>\n");
    html
}

fn strip(text: &str, filters: &[String]) -> String {
    filters
        .iter()
        .filter(|filter| !filter.is_empty())
        .fold(text.to_string(), |text, filter| text.replace(filter.as_str(), ""))
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
