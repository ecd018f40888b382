// This module renders the static site from the JSON view models on disk
// Output depends only on the view models, so re-rendering unchanged data gives identical pages

use std::fmt::Write as _;
use tracing::{info, warn};

use crate::error::Result;
use crate::leaderboards::{AccoladeLeaders, LeaderboardData, PairRow, RecordRow};
use crate::paths::ArtifactPaths;
use crate::preview::{PreviewData, PreviewMatchup};
use crate::report::ReportCardData;
use crate::store::{read_json_opt, write_atomic};

pub const INDEX_PAGE: &str = "index.html";
pub const REPORT_PAGE: &str = "weekly_report.html";
pub const PREVIEW_PAGE: &str = "weekly_preview.html";
pub const LEADERBOARDS_PAGE: &str = "leaderboards.html";

const STYLE: &str = "body { font-family: 'Courier New', Courier, monospace; background: #000; color: #0f0; margin: 0; padding: 20px; }
.container { max-width: 950px; margin: 20px auto; padding: 20px; border: 1px solid #0f0; }
.nav-bar { padding: 5px; border: 1px solid #0f0; margin-bottom: 20px; text-align: center; }
.nav-bar a { color: #0f0; font-weight: bold; text-decoration: none; }
h1, h2 { text-align: center; border-bottom: 1px solid #0f0; padding-bottom: 10px; }
table { width: 100%; border-collapse: collapse; margin-top: 15px; }
th, td { padding: 4px 6px; text-align: left; border: 1px solid #050; }
.delta-pos { color: #3f3; }
.delta-neg { color: #f33; }
.record { color: #ff0; font-weight: bold; }
.matchup { border: 1px solid #050; padding: 10px 15px; margin-bottom: 15px; }";

/// Escape text for HTML element and attribute content
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

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"UTF-8\">\n<title>{}</title>\n<style>\n{}\n</style>\n</head>\n<body>\n<div class=\"container\">\n<div class=\"nav-bar\"><a href=\"{}\">Index</a></div>\n{}</div>\n</body>\n</html>\n",
        escape_html(title),
        STYLE,
        INDEX_PAGE,
        body
    )
}

/// "+2" / "-1" / "-" with its css class
fn delta_cell(delta: Option<i32>) -> (String, &'static str) {
    match delta {
        Some(d) if d > 0 => (format!("+{}", d), "delta-pos"),
        Some(d) if d < 0 => (d.to_string(), "delta-neg"),
        _ => ("-".to_string(), ""),
    }
}

fn marker(won: bool) -> &'static str {
    if won {
        "W"
    } else {
        ""
    }
}

pub fn render_report(data: &ReportCardData) -> String {
    let mut body = String::new();
    let _ = writeln!(body, "<h1>{} Week {} Report Card</h1>", data.season, data.week);

    body.push_str("<h2>Alternative Universe Standings</h2>\n<table>\n<thead><tr><th>Alt</th><th>&Delta;A</th><th>W?</th><th>Real</th><th>&Delta;R</th><th>W?</th><th>Manager</th><th>Wk Score</th><th>Total PF</th><th>Alt Rec</th><th>Real Rec</th></tr></thead>\n<tbody>\n");
    for row in &data.rows {
        let (alt_delta, alt_class) = delta_cell(row.alt_delta);
        let (real_delta, real_class) = delta_cell(row.real_delta);
        let real_rank = row.real_rank.map_or_else(|| "-".to_string(), |r| r.to_string());
        let weekly = row.weekly_score.map_or_else(|| "-".to_string(), |s| format!("{:.2}", s));
        let _ = writeln!(
            body,
            "<tr><td>{}</td><td class=\"{}\">{}</td><td>{}</td><td>{}</td><td class=\"{}\">{}</td><td>{}</td><td>{}</td><td>{}</td><td>{:.2}</td><td>{}</td><td>{}</td></tr>",
            row.alt_rank,
            alt_class,
            alt_delta,
            marker(row.alt_winner),
            real_rank,
            real_class,
            real_delta,
            marker(row.real_winner),
            escape_html(&row.manager),
            weekly,
            row.points_for,
            row.alt_record,
            row.real_record
        );
    }
    body.push_str("</tbody>\n</table>\n");

    body.push_str("<h2>Weekly Accolades</h2>\n");
    if data.accolades.is_empty() {
        body.push_str("<p>No accolades this week.</p>\n");
    } else {
        body.push_str("<ul>\n");
        for a in &data.accolades {
            let flag = if a.record_breaking {
                " <span class=\"record\">NEW ALL-TIME RECORD</span>"
            } else {
                ""
            };
            let _ = writeln!(
                body,
                "<li><strong>{}</strong>: {} vs {} ({:.2}) <span class=\"count\">x{} this season</span>{}</li>",
                escape_html(&a.title),
                escape_html(&a.manager),
                escape_html(&a.opponent),
                a.value,
                a.season_count,
                flag
            );
        }
        body.push_str("</ul>\n");
    }

    page(&format!("Week {} Report Card", data.week), &body)
}

fn render_matchup(body: &mut String, m: &PreviewMatchup) {
    let _ = writeln!(
        body,
        "<div class=\"matchup\">\n<h3>{}. {} ({}) {} vs {}. {} ({}) {}</h3>",
        m.team1.rank,
        escape_html(&m.team1.name),
        escape_html(&m.team1.manager),
        m.team1.record,
        m.team2.rank,
        escape_html(&m.team2.name),
        escape_html(&m.team2.manager),
        m.team2.record
    );
    match &m.h2h {
        Some(h) => {
            let _ = writeln!(body, "<p>Meetings: {}</p>", h.meetings);
            let _ = writeln!(body, "<p>Season H2H: {}</p>", h.regular_record);
            let _ = writeln!(body, "<p>Streak: {}</p>", escape_html(&h.streak));
            let _ = writeln!(body, "<p>Playoffs H2H: {}</p>", escape_html(&h.playoff_display));
        }
        None => body.push_str("<p>Season H2H: 0-0</p>\n<p>Streak: First Meeting</p>\n<p>Playoffs H2H: 0-0</p>\n"),
    }
    body.push_str("</div>\n");
}

pub fn render_preview(data: &PreviewData) -> String {
    let mut body = String::new();
    let _ = writeln!(body, "<h1>{} Week {} Preview</h1>", data.season, data.week);
    if data.matchups.is_empty() {
        body.push_str("<p>No matchups scheduled.</p>\n");
    }
    for m in &data.matchups {
        render_matchup(&mut body, m);
    }
    page(&format!("Week {} Preview", data.week), &body)
}

fn render_pair_board(body: &mut String, title: &str, rows: &[PairRow]) {
    let _ = writeln!(body, "<h3>{}</h3>", escape_html(title));
    if rows.is_empty() {
        body.push_str("<p>No qualifying matchups.</p>\n");
        return;
    }
    body.push_str("<table>\n<thead><tr><th>Rank</th><th>Manager</th><th>Opponent</th><th>Record</th><th>Win %</th></tr></thead>\n<tbody>\n");
    for (i, r) in rows.iter().enumerate() {
        let _ = writeln!(
            body,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}-{}</td><td>{:.3}</td></tr>",
            i + 1,
            escape_html(&r.manager),
            escape_html(&r.opponent),
            r.wins,
            r.losses,
            r.win_pct
        );
    }
    body.push_str("</tbody>\n</table>\n");
}

fn render_record_board(body: &mut String, title: &str, rows: &[RecordRow]) {
    let _ = writeln!(body, "<h3>{}</h3>", escape_html(title));
    body.push_str("<table>\n<thead><tr><th>Rank</th><th>Manager</th><th>Record</th><th>Win %</th></tr></thead>\n<tbody>\n");
    for (i, r) in rows.iter().enumerate() {
        let _ = writeln!(
            body,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{:.3}</td></tr>",
            i + 1,
            escape_html(&r.manager),
            r.record,
            r.win_pct
        );
    }
    body.push_str("</tbody>\n</table>\n");
}

fn render_accolade_leaders(body: &mut String, leaders: &[AccoladeLeaders]) {
    if leaders.is_empty() {
        body.push_str("<p>No accolades awarded.</p>\n");
        return;
    }
    body.push_str("<ul>\n");
    for l in leaders {
        let names: Vec<String> = l.leaders.iter().map(|m| escape_html(m)).collect();
        let _ = write!(body, "<li><strong>{}</strong>: {} ({}x)", escape_html(&l.title), names.join(", "), l.count);
        if let Some(rec) = &l.record {
            let _ = write!(
                body,
                " <span class=\"record\">Record: {} vs {}, {:.2} (Wk{}'{:02})</span>",
                escape_html(&rec.manager),
                escape_html(&rec.opponent),
                rec.value,
                rec.week,
                rec.season % 100
            );
        }
        body.push_str("</li>\n");
    }
    body.push_str("</ul>\n");
}

pub fn render_leaderboards(data: &LeaderboardData) -> String {
    let mut body = String::new();
    let _ = writeln!(body, "<h1>All-Time Leaderboards</h1>\n<p>Through {} week {}</p>", data.season, data.week);

    body.push_str("<h2>Longest Head-to-Head Streaks</h2>\n");
    if data.streaks.is_empty() {
        body.push_str("<p>No streaks yet.</p>\n");
    } else {
        body.push_str("<table>\n<thead><tr><th>Rank</th><th>Streak</th><th>Winner</th><th>Loser</th><th>Span</th></tr></thead>\n<tbody>\n");
        for (i, s) in data.streaks.iter().enumerate() {
            let _ = writeln!(
                body,
                "<tr><td>{}</td><td>{}{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                i + 1,
                s.length,
                if s.active { "*" } else { "" },
                escape_html(&s.winner),
                escape_html(&s.loser),
                escape_html(&s.range)
            );
        }
        body.push_str("</tbody>\n</table>\n<p>* = active streak</p>\n");
    }

    body.push_str("<h2>Head-to-Head Dominance</h2>\n");
    render_pair_board(&mut body, "Regular Season Win % (min 3 wins)", &data.pair_win_pct);
    render_pair_board(&mut body, "Most Regular Season Wins", &data.pair_most_wins);
    render_pair_board(&mut body, "Most Playoff Wins", &data.playoff_most_wins);

    body.push_str("<h2>All-Time Records</h2>\n");
    render_record_board(&mut body, "Regular Season", &data.regular_records);
    render_record_board(&mut body, "Playoffs", &data.playoff_records);

    body.push_str("<h2>Accolade Leaders</h2>\n<h3>All-Time</h3>\n");
    render_accolade_leaders(&mut body, &data.all_time_accolades);
    for season in &data.season_accolades {
        let _ = writeln!(body, "<h3>{} Season</h3>", season.season);
        render_accolade_leaders(&mut body, &season.leaders);
    }

    page("All-Time Leaderboards", &body)
}

pub fn render_index(
    report: Option<&ReportCardData>,
    preview: Option<&PreviewData>,
    boards: Option<&LeaderboardData>,
) -> String {
    let mut body = String::from("<h1>League Site</h1>\n<ul>\n");
    if let Some(r) = report {
        let _ = writeln!(body, "<li><a href=\"{}\">{} Week {} Report Card</a></li>", REPORT_PAGE, r.season, r.week);
    }
    if let Some(p) = preview {
        let _ = writeln!(body, "<li><a href=\"{}\">{} Week {} Preview</a></li>", PREVIEW_PAGE, p.season, p.week);
    }
    if boards.is_some() {
        let _ = writeln!(body, "<li><a href=\"{}\">All-Time Leaderboards</a></li>", LEADERBOARDS_PAGE);
    }
    if report.is_none() && preview.is_none() && boards.is_none() {
        body.push_str("<li>Nothing published yet.</li>\n");
    }
    body.push_str("</ul>\n");
    page("League Site", &body)
}

/// Render every page whose view model exists; returns the pages written
pub fn render_site(paths: &ArtifactPaths) -> Result<Vec<&'static str>> {
    let report: Option<ReportCardData> = read_json_opt(&paths.report())?;
    let preview: Option<PreviewData> = read_json_opt(&paths.preview())?;
    let boards: Option<LeaderboardData> = read_json_opt(&paths.leaderboards())?;
    let mut written = Vec::new();

    match &report {
        Some(data) => {
            write_atomic(&paths.page(REPORT_PAGE), render_report(data).as_bytes())?;
            written.push(REPORT_PAGE);
        }
        None => warn!("No report data at {}, skipping {}", paths.report().display(), REPORT_PAGE),
    }
    match &preview {
        Some(data) => {
            write_atomic(&paths.page(PREVIEW_PAGE), render_preview(data).as_bytes())?;
            written.push(PREVIEW_PAGE);
        }
        None => warn!("No preview data at {}, skipping {}", paths.preview().display(), PREVIEW_PAGE),
    }
    match &boards {
        Some(data) => {
            write_atomic(&paths.page(LEADERBOARDS_PAGE), render_leaderboards(data).as_bytes())?;
            written.push(LEADERBOARDS_PAGE);
        }
        None => warn!("No leaderboard data at {}, skipping {}", paths.leaderboards().display(), LEADERBOARDS_PAGE),
    }

    write_atomic(
        &paths.page(INDEX_PAGE),
        render_index(report.as_ref(), preview.as_ref(), boards.as_ref()).as_bytes(),
    )?;
    written.push(INDEX_PAGE);

    info!("Rendered {} pages into {}", written.len(), paths.site_dir().display());
    Ok(written)
}
