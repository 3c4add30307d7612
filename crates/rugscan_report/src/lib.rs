//! HTML rendering of a scan report: an embeddable fragment and a standalone document.

mod format;

pub use format::{format_amount, format_count, format_percent, format_price, format_usd};

use rugscan::model::SocialLink;
use rugscan::{CoinReport, Verdict};
use std::fmt::Write as _;
use std::io::Write;
use std::path::Path;

/// Render the standalone document to `out_path`.
pub fn render_document(report: &CoinReport, out_path: impl AsRef<Path>) -> Result<(), ReportError> {
    let html = build_document(report)?;
    let mut f = std::fs::File::create(out_path.as_ref()).map_err(ReportError::Io)?;
    f.write_all(html.as_bytes()).map_err(ReportError::Io)?;
    Ok(())
}

/// Suggested file name for a downloaded report.
pub fn document_file_name(report: &CoinReport) -> String {
    let slug: String = report
        .coin
        .id
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect();
    format!("rugscan-{}.html", if slug.is_empty() { "report" } else { &slug })
}

/// Fragment wrapped in a full page with styles. Embeds the report JSON.
pub fn build_document(report: &CoinReport) -> Result<String, ReportError> {
    let json_embed = serde_json::to_string(report).map_err(ReportError::Json)?;
    let html = format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8"/>
<meta name="viewport" content="width=device-width,initial-scale=1"/>
<title>Rug Pull Risk Report – {name}</title>
<style>
:root {{ font-family: system-ui, sans-serif; background: #0f1419; color: #e6edf3; }}
body {{ max-width: 860px; margin: 0 auto; padding: 1.5rem; }}
h2 {{ font-size: 1.4rem; margin-bottom: 0.5rem; }}
h3 {{ font-size: 1.1rem; margin-top: 1.5rem; color: #8b949e; }}
a {{ color: #58a6ff; }}
.table {{ width: 100%; border-collapse: collapse; margin: 0.5rem 0; }}
.table td, .table th {{ border: 1px solid #30363d; padding: 0.4rem 0.6rem; text-align: left; }}
.section-header td {{ background: #161b22; font-weight: 600; }}
.text-warning {{ color: #d29922; }}
.text-danger {{ color: #f85149; }}
.verdict-low {{ color: #3fb950; font-weight: 600; }}
.verdict-high {{ color: #f85149; font-weight: 600; }}
.footer {{ margin-top: 2rem; font-size: 0.85rem; color: #8b949e; }}
</style>
</head>
<body>
{fragment}
<script type="application/json" id="scan-report">{json_embed}</script>
<div class="footer">
  <p>Generated by rugscan. Heuristic signals only; not financial advice.</p>
</div>
</body>
</html>"#,
        name = escape_html(report.display_name()),
        fragment = build_fragment(report),
        json_embed = escape_json_in_script(&json_embed),
    );
    Ok(html)
}

/// Heading, market table and detailed-analysis table.
pub fn build_fragment(report: &CoinReport) -> String {
    let mut html = String::new();
    let symbol = escape_html(&report.display_symbol());
    let d = &report.data;

    let _ = write!(
        html,
        r#"<h2>{name}</h2>
<p><strong>Search Time:</strong> {time} (Query took {secs:.2} seconds)</p>
<h3>Market Data</h3>
<table class="table">
<thead><tr><th>Price (USD)</th><th>Market Cap (USD)</th><th>24h Volume (USD)</th><th>24h Price Change (%)</th></tr></thead>
<tbody><tr><td>{price}</td><td>{cap}</td><td>{vol}</td><td>{change}</td></tr></tbody>
</table>
"#,
        name = escape_html(report.display_name()),
        time = escape_html(&report.search_time),
        secs = report.query_duration,
        price = format_price(d.price),
        cap = format_usd(d.market_cap),
        vol = format_usd(d.volume_24h),
        change = format_percent(d.price_change_24h),
    );

    if report.providers.len() > 1 {
        html.push_str(
            "<h3>Provider Comparison</h3>\n<table class=\"table\">\n<thead><tr><th>Provider</th><th>Price (USD)</th><th>24h Volume (USD)</th></tr></thead>\n<tbody>\n",
        );
        for p in &report.providers {
            let _ = writeln!(
                html,
                "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
                escape_html(&p.provider),
                format_price(p.quote.price),
                format_usd(p.quote.volume_24h),
            );
        }
        html.push_str("</tbody></table>\n");
    }

    html.push_str("<h3>Detailed Analysis</h3>\n<table class=\"table\">\n<tbody>\n");

    if let Some(s) = &report.market_sentiment {
        section(&mut html, "Market Sentiment");
        row(
            &mut html,
            "Fear/Greed Index",
            &format!("{} ({}/100)", escape_html(&s.classification), s.value),
        );
    }

    section(&mut html, "Social Media");
    for (label, link) in report.socials.channels() {
        row(&mut html, label, &social_cell(label, link));
    }

    section(&mut html, "Community Engagement");
    let c = &report.community;
    row(&mut html, "X Followers", &format_count(c.twitter_followers));
    row(&mut html, "Telegram Members", &format_count(c.telegram_members));
    row(&mut html, "Reddit Subscribers", &format_count(c.reddit_subscribers));

    if let Some(github) = &report.developer.github {
        let dev = &report.developer;
        section(&mut html, "Developer Activity");
        row(
            &mut html,
            "GitHub",
            &format!(
                "<a href=\"{}\" target=\"_blank\">Repository</a> (✅)",
                escape_html(github)
            ),
        );
        row(&mut html, "Commits (Last 30d)", &dev.commits.to_string());
        row(&mut html, "Stars", &format_count(dev.stars));
        row(
            &mut html,
            "Last Update",
            &escape_html(dev.last_update.as_deref().unwrap_or("Unknown")),
        );
    }

    section(&mut html, "Tokenomics");
    let t = &report.tokenomics;
    row(
        &mut html,
        "Circulating Supply",
        &format!("{} {}", format_amount(t.circulating_supply), symbol),
    );
    row(
        &mut html,
        "Total Supply",
        &format!("{} {}", format_amount(t.total_supply), symbol),
    );
    row(
        &mut html,
        "Max Supply",
        &t.max_supply
            .map_or_else(|| "None".to_string(), |m| format!("{} {}", format_amount(m), symbol)),
    );

    if let Some(info) = &report.chain_info {
        section(&mut html, "Additional Info");
        warn_row(&mut html, "Chain Info", &escape_html(info));
    }

    if !report.is_native {
        section(&mut html, "Liquidity");
        warn_row(&mut html, "Status", &escape_html(&report.liquidity.note));
    }

    if let Some(holders) = &report.holders {
        section(
            &mut html,
            &format!("Top Holders ({})", holders.chain.display_name()),
        );
        for h in &holders.top_holders {
            let short: String = h.address.chars().take(6).collect();
            row(
                &mut html,
                "Holder",
                &format!("{}...: {:.2}%", escape_html(&short), h.percentage),
            );
        }
        row(&mut html, "Total Top 10", &format!("{:.2}%", holders.total_top10));
    }

    if !report.risks.is_empty() {
        section(&mut html, "Rug Pull Risks");
        for r in &report.risks {
            let _ = writeln!(
                html,
                "<tr><td>Risk</td><td class=\"text-danger\">{}</td></tr>",
                escape_html(r)
            );
        }
    }

    if let Some(link) = &report.audit_link {
        section(&mut html, "Audit");
        row(
            &mut html,
            "Audit Link",
            &format!(
                "<a href=\"{}\" target=\"_blank\">View Audit</a>",
                escape_html(link)
            ),
        );
    }

    if !report.errors.is_empty() {
        section(&mut html, "Provider Errors");
        for e in &report.errors {
            warn_row(&mut html, "Error", &escape_html(e));
        }
    }

    let (class, icon) = match report.risk_level {
        Verdict::Low => ("verdict-low", "🟢"),
        Verdict::High => ("verdict-high", "🔴"),
    };
    section(&mut html, "Verdict");
    let _ = writeln!(
        html,
        "<tr><td>Verdict</td><td class=\"{}\">{} {}</td></tr>",
        class,
        escape_html(&report.verdict),
        icon
    );

    html.push_str("</tbody></table>\n");
    html
}

fn section(html: &mut String, title: &str) {
    let _ = writeln!(
        html,
        "<tr class=\"section-header\"><td colspan=\"2\">{}</td></tr>",
        escape_html(title)
    );
}

/// `value` is inserted as-is; callers escape.
fn row(html: &mut String, label: &str, value: &str) {
    let _ = writeln!(html, "<tr><td>{}</td><td>{}</td></tr>", escape_html(label), value);
}

fn warn_row(html: &mut String, label: &str, value: &str) {
    let _ = writeln!(
        html,
        "<tr><td>{}</td><td class=\"text-warning\">{} ⚠️</td></tr>",
        escape_html(label),
        value
    );
}

fn social_cell(label: &str, link: &SocialLink) -> String {
    match (&link.url, link.verified) {
        (Some(url), true) => {
            let text = if label == "Discord" {
                "Server".to_string()
            } else {
                escape_html(link.handle.as_deref().unwrap_or(url))
            };
            format!(
                "<a href=\"{}\" target=\"_blank\">{}</a> (✅)",
                escape_html(url),
                text
            )
        }
        _ => "None (❌)".to_string(),
    }
}

/// Keeps serialized JSON parseable inside a `<script>` element: markup
/// characters become JSON unicode escapes instead of HTML entities.
fn escape_json_in_script(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '<' => out.push_str("\\u003c"),
            '>' => out.push_str("\\u003e"),
            '&' => out.push_str("\\u0026"),
            _ => out.push(c),
        }
    }
    out
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[derive(Debug)]
pub enum ReportError {
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl std::fmt::Display for ReportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportError::Io(e) => write!(f, "io: {}", e),
            ReportError::Json(e) => write!(f, "json: {}", e),
        }
    }
}

impl std::error::Error for ReportError {}

#[cfg(test)]
mod tests {
    use super::*;
    use rugscan::model::{
        Chain, Community, Developer, HolderSnapshot, LiquidityStatus, MarketQuote, ResolvedCoin,
        Socials, Tokenomics,
    };

    fn report() -> CoinReport {
        CoinReport {
            search_time: "2024-05-01 12:00:00 UTC".into(),
            query_duration: 1.234,
            coin: ResolvedCoin {
                id: "scamcoin".into(),
                symbol: "scam".into(),
                name: None,
            },
            data: MarketQuote {
                name: Some("<b>Scam</b>".into()),
                price: Some(0.00000812),
                ..Default::default()
            },
            providers: vec![],
            market_sentiment: None,
            socials: Socials::default(),
            community: Community::default(),
            developer: Developer::default(),
            tokenomics: Tokenomics::default(),
            liquidity: LiquidityStatus::unverified(),
            holders: Some(HolderSnapshot::from_balances(
                Chain::Bsc,
                vec![("0x1234567890".into(), 500.0)],
                1_000.0,
            )),
            risks: vec!["Liquidity not locked: Potential rug pull risk".into()],
            flags: vec![],
            risk_level: Verdict::High,
            verdict: Verdict::High.text().into(),
            chain: Some(Chain::Bsc),
            chain_info: None,
            is_native: false,
            audit_link: Some("https://audit.example/?a=1&b=\"2\"".into()),
            errors: vec![],
        }
    }

    #[test]
    fn fragment_escapes_and_formats() {
        let html = build_fragment(&report());
        assert!(html.contains("&lt;b&gt;Scam&lt;/b&gt;"));
        assert!(!html.contains("<b>Scam</b>"));
        assert!(html.contains("$0.00000812"));
        assert!(html.contains("(Query took 1.23 seconds)"));
        assert!(html.contains("Top Holders (BSC)"));
        assert!(html.contains("0x1234...: 50.00%"));
        assert!(html.contains("https://audit.example/?a=1&amp;b=&quot;2&quot;"));
        assert!(html.contains("verdict-high"));
        assert!(html.contains("None (❌)"));
    }

    #[test]
    fn native_coin_hides_liquidity() {
        let mut r = report();
        r.is_native = true;
        r.chain_info = Some("Native chain coin (e.g., BNB on BSC). Holder data unavailable.".into());
        let html = build_fragment(&r);
        assert!(html.contains("Chain Info"));
        assert!(!html.contains("Liquidity lock status unavailable"));
    }

    #[test]
    fn document_embeds_report() {
        let html = build_document(&report()).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("id=\"scan-report\""));
        assert!(html.contains("Rug Pull Risk Report"));

        let body = html
            .split_once("id=\"scan-report\">")
            .and_then(|(_, rest)| rest.split_once("</script>"))
            .map(|(body, _)| body)
            .unwrap();
        assert!(!body.contains('<'));
        assert!(!body.contains("&quot;"));
        assert!(body.contains("\\u003cb\\u003eScam"));
        let parsed: serde_json::Value = serde_json::from_str(body).unwrap();
        assert_eq!(parsed, serde_json::to_value(report()).unwrap());
    }

    #[test]
    fn file_name_is_slugged() {
        let mut r = report();
        assert_eq!(document_file_name(&r), "rugscan-scamcoin.html");
        r.coin.id = "../..".into();
        assert_eq!(document_file_name(&r), "rugscan-report.html");
    }
}
