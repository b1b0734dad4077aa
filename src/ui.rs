use crate::capture::CaptureState;
use crate::models::{AnalyticsResponse, Mood, MoodHistory, UserId, WeeklySeries};
use crate::notify::{Notification, Severity};
use crate::quotes::SIGNATURE;
use crate::therapists::Therapist;
use std::fmt::Write;

pub struct TrackerView<'a> {
    pub user: &'a UserId,
    pub capture: CaptureState,
    pub can_confirm: bool,
    pub history: &'a MoodHistory,
    pub analytics: &'a AnalyticsResponse,
    pub quote: Option<(Mood, &'static str)>,
    pub therapists: &'a [Therapist],
    pub notifications: &'a [Notification],
}

pub fn render_sign_in(hosted_url: Option<&str>, error: Option<&str>) -> String {
    let body = match hosted_url {
        Some(url) => format!(
            r#"<a class="primary" href="{}">Continue to sign in</a>"#,
            escape(url)
        ),
        None => SIGN_IN_FORMS.to_string(),
    };
    let error = error
        .map(|message| format!(r#"<div class="toast destructive">{}</div>"#, escape(message)))
        .unwrap_or_default();

    PAGE.replace("{{TITLE}}", "Wellness Tracker")
        .replace(
            "{{BODY}}",
            &format!(
                r#"<main class="narrow">
  <header><h1>Wellness Tracker</h1><p class="muted">Track your mood, find your balance</p></header>
  {error}
  <section class="card">{body}</section>
  <p class="muted center">Ready to start your wellness journey? 🌱</p>
</main>"#
            ),
        )
}

pub fn render_tracker(view: &TrackerView<'_>) -> String {
    let mut body = String::new();
    body.push_str(r#"<main>"#);
    let _ = write!(
        body,
        r#"<header class="bar"><div><h1>💚 Wellness Tracker</h1><p class="muted">Take a moment to check in with yourself. How are you feeling right now?</p></div>
<form method="post" action="/sign-out"><span class="muted">{}</span> <button class="ghost" type="submit">Sign out</button></form></header>"#,
        escape(view.user.as_str())
    );

    render_notifications(&mut body, view.notifications);
    render_picker(&mut body, view);
    if let Some((mood, quote)) = view.quote {
        let _ = write!(
            body,
            r#"<section class="card quote {mood}"><p>“{}”</p><p class="muted right">— {SIGNATURE}</p></section>"#,
            escape(quote)
        );
    }
    render_summary(&mut body, view.history);
    render_analytics(&mut body, view.analytics);
    render_therapists(&mut body, view.therapists);

    body.push_str("</main>");
    PAGE.replace("{{TITLE}}", "Wellness Tracker").replace("{{BODY}}", &body)
}

fn render_notifications(out: &mut String, notifications: &[Notification]) {
    for note in notifications {
        let class = match note.severity {
            Severity::Info => "info",
            Severity::Destructive => "destructive",
        };
        let _ = write!(
            out,
            r#"<div class="toast {class}"><strong>{}</strong><span>{}</span></div>"#,
            escape(&note.title),
            escape(&note.description)
        );
    }
}

fn render_picker(out: &mut String, view: &TrackerView<'_>) {
    out.push_str(r#"<section class="card"><h2>How are you feeling?</h2><p class="muted">Select your current mood</p><div class="moods">"#);
    for mood in Mood::ALL {
        let selected = match view.capture {
            CaptureState::Selected(current) | CaptureState::Saving(current) => current == mood,
            _ => false,
        };
        let _ = write!(
            out,
            r#"<form method="post" action="/mood/select"><input type="hidden" name="mood" value="{mood}"><button type="submit" class="mood{}" style="--mood: {}"><span class="emoji">{}</span>{}</button></form>"#,
            if selected { " selected" } else { "" },
            mood.color(),
            mood.emoji(),
            mood.label()
        );
    }
    out.push_str("</div>");
    if view.can_confirm {
        out.push_str(
            r#"<form method="post" action="/mood/confirm" class="center"><button class="primary" type="submit">Log My Mood</button></form>"#,
        );
    }
    out.push_str("</section>");
}

fn render_summary(out: &mut String, history: &MoodHistory) {
    let (emoji, last) = match history.latest() {
        Some(record) => (record.mood.emoji(), format!("Last logged: {}", record.date())),
        None => ("💭", "No mood logged yet".to_string()),
    };
    let noun = if history.len() == 1 { "mood entry" } else { "mood entries" };
    let _ = write!(
        out,
        r#"<div class="grid two"><section class="card center"><h3>Recent Mood</h3><div class="big">{emoji}</div><p class="muted">{last}</p></section>
<section class="card center"><h3>Your Progress</h3><div class="big">{}</div><p class="muted">{noun} logged</p><p class="muted small">Keep tracking for better insights!</p></section></div>"#,
        history.len()
    );

    if history.is_empty() {
        return;
    }
    out.push_str(r#"<section class="card"><h3>Recent Entries</h3><ul class="entries">"#);
    for record in history.recent(5) {
        let _ = write!(
            out,
            r#"<li><span>{} {}</span><span class="muted">{}</span></li>"#,
            record.mood.emoji(),
            record.mood.label(),
            record.date()
        );
    }
    out.push_str("</ul></section>");
}

fn render_analytics(out: &mut String, analytics: &AnalyticsResponse) {
    out.push_str(r#"<h2 class="center">Your Mood Analytics</h2><div class="grid two">"#);

    render_week(out, "Weekly Mood Trends", &analytics.weekly_sample);
    render_week(out, "This Week", &analytics.current_week);

    let distribution = &analytics.distribution;
    let total = distribution.total().max(1);
    out.push_str(r#"<section class="card"><h3>Mood Distribution</h3>"#);
    if distribution.sample {
        out.push_str(r#"<p class="muted small">Sample data. Log a mood to see your own.</p>"#);
    }
    out.push_str(r#"<ul class="entries">"#);
    for entry in &distribution.entries {
        let _ = write!(
            out,
            r#"<li><span><i class="dot" style="background:{}"></i>{} {}</span><span class="muted">{} entries · {}%</span></li>"#,
            entry.color,
            entry.emoji,
            entry.label,
            entry.count,
            entry.count * 100 / total
        );
    }
    out.push_str("</ul></section>");

    let insights = &analytics.insights;
    let _ = write!(
        out,
        r#"<section class="card"><h3>Weekly Insights</h3><div class="grid three center">
<div><div class="big">{}</div><p class="muted small">Most Common Mood</p></div>
<div><div class="big">{}</div><p class="muted small">Total Mood Entries</p></div>
<div><div class="big">{} days</div><p class="muted small">Tracking Streak</p></div></div>
<p class="note">{}</p></section>"#,
        insights.most_common.label(),
        insights.total_entries,
        insights.tracking_streak_days,
        insights.encouragement
    );
    out.push_str("</div>");
}

fn render_week(out: &mut String, title: &str, series: &WeeklySeries) {
    let peak = series
        .points
        .iter()
        .map(|point| point.counts.total())
        .max()
        .unwrap_or(0)
        .max(1);

    let _ = write!(out, r#"<section class="card"><h3>{title}</h3>"#);
    if series.illustrative {
        out.push_str(r#"<p class="muted small">Illustrative sample, not your recorded days.</p>"#);
    }
    out.push_str(r#"<div class="chart">"#);
    for point in &series.points {
        out.push_str(r#"<div class="column"><div class="stack">"#);
        for mood in Mood::ALL {
            let count = point.counts.get(mood);
            if count == 0 {
                continue;
            }
            let _ = write!(
                out,
                r#"<div title="{}: {count} entries" style="height:{}%;background:{}"></div>"#,
                mood,
                count * 100 / peak,
                mood.color()
            );
        }
        let _ = write!(out, r#"</div><span class="muted small">{}</span></div>"#, point.day);
    }
    out.push_str("</div></section>");
}

fn render_therapists(out: &mut String, therapists: &[Therapist]) {
    out.push_str(r#"<h2 id="therapists" class="center">Connect with Professional Therapists</h2><div class="grid three">"#);
    for therapist in therapists {
        let _ = write!(
            out,
            r#"<section class="card"><div class="big center">{}</div><h3 class="center">{}</h3><p class="muted center small">★ {} · {}</p><p class="small">{}</p><p class="small"><strong>Specialties:</strong> {}</p><p class="muted small">{}</p>
<div class="row"><form method="post" action="/therapists/{id}/book"><button class="primary" type="submit">Book</button></form><form method="post" action="/therapists/{id}/message"><button class="ghost" type="submit">Message</button></form></div></section>"#,
            therapist.avatar,
            therapist.name,
            therapist.rating,
            therapist.experience,
            therapist.bio,
            therapist.specialties.join(", "),
            therapist.approach,
            id = therapist.id
        );
    }
    out.push_str("</div>");
}

fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

const SIGN_IN_FORMS: &str = r#"<div class="grid two">
  <form method="post" action="/sign-in">
    <h2>Welcome Back</h2>
    <input type="hidden" name="mode" value="login" />
    <label>Email <input type="email" name="email" placeholder="Enter your email" /></label>
    <label>Password <input type="password" name="password" placeholder="Enter your password" /></label>
    <button class="primary" type="submit">Sign In</button>
  </form>
  <form method="post" action="/sign-in">
    <h2>Create Account</h2>
    <input type="hidden" name="mode" value="signup" />
    <label>Email <input type="email" name="email" placeholder="Enter your email" /></label>
    <label>Password <input type="password" name="password" placeholder="Create a password" /></label>
    <button class="primary" type="submit">Create Account</button>
  </form>
</div>"#;

const PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>{{TITLE}}</title>
  <style>
    :root {
      --bg: #f2f7f5;
      --ink: #23312d;
      --muted: #6b7c76;
      --primary: #3f9c84;
      --card: rgba(255, 255, 255, 0.9);
      --shadow: 0 18px 40px rgba(35, 49, 45, 0.12);
    }
    * { box-sizing: border-box; }
    body {
      margin: 0;
      background: linear-gradient(160deg, #e6f4ef, var(--bg) 50%, #f7f1fb);
      color: var(--ink);
      font-family: "Inter", "Segoe UI", sans-serif;
    }
    main { width: min(1040px, 100%); margin: 0 auto; padding: 28px 18px 56px; display: grid; gap: 20px; }
    main.narrow { width: min(720px, 100%); }
    h1 { margin: 0; font-size: 2rem; }
    h2, h3 { margin: 0 0 10px; }
    .bar { display: flex; justify-content: space-between; align-items: center; gap: 16px; flex-wrap: wrap; }
    .card { background: var(--card); border-radius: 20px; box-shadow: var(--shadow); padding: 22px; }
    .grid { display: grid; gap: 18px; }
    .grid.two { grid-template-columns: repeat(auto-fit, minmax(280px, 1fr)); }
    .grid.three { grid-template-columns: repeat(auto-fit, minmax(220px, 1fr)); }
    .row { display: flex; gap: 8px; }
    .center { text-align: center; }
    .right { text-align: right; }
    .muted { color: var(--muted); }
    .small { font-size: 0.85rem; }
    .big { font-size: 2.2rem; font-weight: 700; color: var(--primary); }
    .moods { display: flex; justify-content: center; gap: 14px; flex-wrap: wrap; margin: 16px 0; }
    .mood {
      display: grid; place-items: center; gap: 6px; width: 92px; height: 92px;
      border-radius: 18px; border: 2px solid var(--mood); background: white; cursor: pointer;
    }
    .mood.selected { background: color-mix(in srgb, var(--mood) 30%, white); transform: scale(1.05); }
    .emoji { font-size: 1.8rem; }
    button { font: inherit; cursor: pointer; }
    .primary { background: var(--primary); color: white; border: none; border-radius: 999px; padding: 10px 26px; text-decoration: none; }
    .ghost { background: transparent; border: 1px solid var(--muted); border-radius: 999px; padding: 8px 18px; }
    label { display: grid; gap: 4px; margin: 10px 0; }
    input { padding: 10px; border-radius: 10px; border: 1px solid #cfdcd7; }
    .toast { border-radius: 14px; padding: 12px 16px; display: grid; gap: 4px; }
    .toast.info { background: #e3f6ee; }
    .toast.destructive { background: #fde4e4; }
    .quote p:first-child { font-style: italic; font-size: 1.1rem; }
    .entries { list-style: none; margin: 0; padding: 0; display: grid; gap: 8px; }
    .entries li { display: flex; justify-content: space-between; padding: 10px; border-radius: 12px; background: #f3f6f5; }
    .dot { display: inline-block; width: 10px; height: 10px; border-radius: 50%; margin-right: 8px; }
    .chart { display: grid; grid-template-columns: repeat(7, 1fr); gap: 8px; height: 180px; align-items: end; }
    .column { display: grid; grid-template-rows: 1fr auto; height: 100%; text-align: center; }
    .stack { display: flex; flex-direction: column-reverse; justify-content: flex-start; height: 100%; }
    .note { background: #eef6f3; border-radius: 12px; padding: 12px; text-align: center; }
  </style>
</head>
<body>
{{BODY}}
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::{bucket_week_at, compute_distribution, compute_insights, generate_illustrative_weekly_sample};
    use crate::models::MoodRecord;
    use crate::therapists::DIRECTORY;
    use chrono::{NaiveDate, TimeZone, Utc};
    use rand::{rngs::StdRng, SeedableRng};

    fn analytics(history: &MoodHistory) -> AnalyticsResponse {
        let today = NaiveDate::from_ymd_opt(2026, 5, 6).unwrap();
        AnalyticsResponse {
            distribution: compute_distribution(history),
            weekly_sample: generate_illustrative_weekly_sample(history, &mut StdRng::seed_from_u64(3)),
            current_week: bucket_week_at(today, history),
            insights: compute_insights(history, today),
        }
    }

    #[test]
    fn sign_in_page_escapes_error() {
        let html = render_sign_in(None, Some("<b>bad</b>"));
        assert!(html.contains("&lt;b&gt;bad&lt;/b&gt;"));
        assert!(html.contains(r#"action="/sign-in""#));

        let hosted = render_sign_in(Some("https://id.example.com"), None);
        assert!(hosted.contains("https://id.example.com"));
        assert!(!hosted.contains(r#"name="password""#));
    }

    #[test]
    fn tracker_page_shows_confirm_only_when_allowed() {
        let user = UserId::new("me@example.com");
        let history = MoodHistory::from_records(vec![MoodRecord::new(
            Mood::Calm,
            Utc.with_ymd_and_hms(2026, 5, 5, 9, 0, 0).unwrap(),
        )]);
        let analytics = analytics(&history);
        let mut view = TrackerView {
            user: &user,
            capture: CaptureState::Selected(Mood::Calm),
            can_confirm: true,
            history: &history,
            analytics: &analytics,
            quote: Some((Mood::Calm, "stay calm")),
            therapists: &DIRECTORY,
            notifications: &[],
        };

        let html = render_tracker(&view);
        assert!(html.contains("Log My Mood"));
        assert!(html.contains("stay calm"));
        assert!(html.contains("Last logged: 2026-05-05"));
        assert!(html.contains("Dr. Sarah Chen"));

        view.can_confirm = false;
        assert!(!render_tracker(&view).contains("Log My Mood"));
    }

    #[test]
    fn empty_history_marks_sample_data() {
        let user = UserId::new("new@example.com");
        let history = MoodHistory::default();
        let analytics = analytics(&history);
        let html = render_tracker(&TrackerView {
            user: &user,
            capture: CaptureState::NoSelection,
            can_confirm: false,
            history: &history,
            analytics: &analytics,
            quote: None,
            therapists: &DIRECTORY,
            notifications: &[],
        });
        assert!(html.contains("No mood logged yet"));
        assert!(html.contains("Sample data"));
        assert!(!html.contains("Recent Entries"));
    }
}
