use chrono::{DateTime, Utc};
use indexmap::IndexMap;

use crate::classifier::Buckets;

pub struct ReportRenderer;

impl ReportRenderer {
    /// E-mail subject naming every topic.
    pub fn subject_line(topics: &[&str]) -> String {
        format!("Resumo semanal — {}", topics.join("/"))
    }

    /// Render the digest. Topics appear in bucket (configured) order.
    pub fn render(
        buckets: &Buckets,
        summaries: &IndexMap<String, String>,
        generated_at: DateTime<Utc>,
    ) -> String {
        let topic_names: Vec<&str> = buckets.keys().map(String::as_str).collect();

        let mut html = String::from("<html><body>");
        html.push_str(&format!(
            "<h1>Resumo semanal — {}</h1>",
            Self::escape_html(&topic_names.join(" · "))
        ));

        for (topic, items) in buckets {
            let summary = summaries.get(topic).map(String::as_str).unwrap_or("");
            html.push_str(&format!(
                "<h2>{} — {} notícias</h2><pre style='white-space:pre-wrap'>{}</pre>",
                Self::escape_html(topic),
                items.len(),
                Self::escape_html(summary)
            ));
        }

        html.push_str(&format!(
            "<hr><p>Gerado em {}</p>",
            generated_at.to_rfc3339()
        ));
        html.push_str("</body></html>");
        html
    }

    fn escape_html(text: &str) -> String {
        text.replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
            .replace('"', "&quot;")
            .replace('\'', "&#39;")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Item;
    use chrono::TimeZone;

    fn fixture() -> (Buckets, IndexMap<String, String>) {
        let mut buckets = Buckets::new();
        buckets.insert(
            "Marketing".to_string(),
            vec![Item::new("a", "1", ""), Item::new("b", "2", "")],
        );
        buckets.insert("IA".to_string(), Vec::new());

        let mut summaries = IndexMap::new();
        summaries.insert("IA".to_string(), "Nada.".to_string());
        summaries.insert(
            "Marketing".to_string(),
            "1) TOP\n- linha um\n- linha dois".to_string(),
        );
        (buckets, summaries)
    }

    #[test]
    fn test_render_sections_in_topic_order_with_counts() {
        let (buckets, summaries) = fixture();
        let date = Utc.with_ymd_and_hms(2025, 10, 13, 12, 0, 0).unwrap();
        let html = ReportRenderer::render(&buckets, &summaries, date);

        assert!(html.starts_with("<html><body><h1>Resumo semanal — Marketing · IA</h1>"));
        let marketing = html.find("<h2>Marketing — 2 notícias</h2>").unwrap();
        let ia = html.find("<h2>IA — 0 notícias</h2>").unwrap();
        assert!(marketing < ia);
        assert!(html.contains("<pre style='white-space:pre-wrap'>1) TOP\n- linha um\n- linha dois</pre>"));
        assert!(html.ends_with("<hr><p>Gerado em 2025-10-13T12:00:00+00:00</p></body></html>"));
    }

    #[test]
    fn test_render_escapes_summary_markup() {
        let mut buckets = Buckets::new();
        buckets.insert("P&D".to_string(), Vec::new());
        let mut summaries = IndexMap::new();
        summaries.insert("P&D".to_string(), "<script>x</script>".to_string());

        let html = ReportRenderer::render(&buckets, &summaries, Utc::now());
        assert!(html.contains("<h2>P&amp;D — 0 notícias</h2>"));
        assert!(html.contains("&lt;script&gt;x&lt;/script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_subject_line() {
        assert_eq!(
            ReportRenderer::subject_line(&["Marketing", "IA", "Brasil"]),
            "Resumo semanal — Marketing/IA/Brasil"
        );
    }

    #[test]
    fn test_escape_html_quotes() {
        assert_eq!(
            ReportRenderer::escape_html("He said \"hello\" & 'bye'"),
            "He said &quot;hello&quot; &amp; &#39;bye&#39;"
        );
    }
}
