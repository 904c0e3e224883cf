//! HTML page renderers.
//!
//! Every page is a pure function from already-resolved content to [`Markup`].
//! Nothing here touches the store or the clock; [`crate::render`] does the
//! resolving and picks the renderer for a [`Page`].
//!
//! ## Layout
//!
//! All pages share [`base_document`]: a header with the church name and the
//! navigation, the page body, and a footer with address, phone, and email.
//! Styles live in `static/style.css` with the configured colors prepended as
//! CSS custom properties; both static files are linked with the build id as a
//! cache-busting query string.
//!
//! ## HTML Generation
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time HTML templating.
//! Interpolated text is escaped. Free-text fields from the store (bios,
//! ministry descriptions, sermon summaries) go through [`markdown`], which
//! renders Markdown but emits any raw HTML in the source as text.

use crate::carousel::{Carousel, CarouselItem};
use crate::config::ChurchConfig;
use crate::contact::ContactForm;
use crate::content::fallback::WEEKLY_SCHEDULE;
use crate::content::{LeadershipRecord, MinistryRecord, MissionRecord, SermonRecord};
use crate::types::{NavItem, Page, navigation};
use chrono::{Datelike, Weekday};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use pulldown_cmark::{CowStr, Event, Parser, Tag, html as md_html};
use std::collections::BTreeMap;

/// Site-wide values every page needs.
#[derive(Debug, Clone, Copy)]
pub struct Layout<'a> {
    pub church: &'a ChurchConfig,
    /// Appended to asset URLs.
    pub build_id: &'a str,
}

/// Inline result shown above the contact form after a submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormNotice {
    Success(String),
    Error(String),
}

// ============================================================================
// HTML Components
// ============================================================================

fn page_title(layout: &Layout, title: &str) -> String {
    if title.is_empty() {
        layout.church.name.clone()
    } else {
        format!("{title} | {}", layout.church.name)
    }
}

/// Renders the base HTML document structure
pub fn base_document(
    layout: &Layout,
    title: &str,
    current_path: &str,
    scripts: &[&str],
    content: Markup,
) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (page_title(layout, title)) }
                link rel="stylesheet" href={ "/static/style.css?v=" (layout.build_id) };
            }
            body {
                (site_header(layout.church, render_nav(&navigation(), current_path)))
                main { (content) }
                (site_footer(layout.church))
                @for script in scripts {
                    script src={ "/static/" (script) "?v=" (layout.build_id) } defer {}
                }
            }
        }
    }
}

/// Renders the site header with logo and navigation
fn site_header(church: &ChurchConfig, nav: Markup) -> Markup {
    html! {
        header.site-header {
            a.logo href="/" {
                span.logo-short { (church.short_name) }
                span.logo-full { (church.name) }
            }
            nav.site-nav { (nav) }
        }
    }
}

/// Renders the navigation menu (hamburger on small screens)
pub fn render_nav(items: &[NavItem], current_path: &str) -> Markup {
    html! {
        input.nav-toggle type="checkbox" id="nav-toggle";
        label.nav-hamburger for="nav-toggle" aria-label="Menu" {
            span.hamburger-line {}
            span.hamburger-line {}
            span.hamburger-line {}
        }
        ul.nav-links {
            @for item in items {
                @let is_current = is_current_path(&item.path, current_path);
                li class=[is_current.then_some("current")] {
                    a href=(item.path) { (item.title) }
                }
            }
        }
    }
}

/// `/ministries` is current on `/ministries/{slug}` too; `/` only on itself.
fn is_current_path(item_path: &str, current_path: &str) -> bool {
    if item_path == "/" {
        current_path == "/"
    } else {
        current_path == item_path || current_path.starts_with(&format!("{item_path}/"))
    }
}

fn site_footer(church: &ChurchConfig) -> Markup {
    html! {
        footer.site-footer {
            div.footer-church {
                p.footer-name { (church.name) }
                address {
                    @for line in &church.address {
                        (line) br;
                    }
                }
            }
            div.footer-contact {
                p { a href={ "tel:" (church.phone) } { (church.phone) } }
                p { a href={ "mailto:" (church.email) } { (church.email) } }
            }
        }
    }
}

fn hero(title: &str, subtitle: &str) -> Markup {
    html! {
        section.hero {
            h1 { (title) }
            @if !subtitle.is_empty() {
                p.hero-subtitle { (subtitle) }
            }
        }
    }
}

/// Whether a link target from store content may be emitted. Relative
/// targets pass; absolute ones need an http, https, mailto, or tel scheme.
pub fn is_safe_url(url: &str) -> bool {
    match url.trim().split_once(':') {
        Some((scheme, _)) if !scheme.contains(['/', '?', '#']) => matches!(
            scheme.to_ascii_lowercase().as_str(),
            "http" | "https" | "mailto" | "tel"
        ),
        _ => true,
    }
}

fn safe_url(url: &str) -> Option<&str> {
    is_safe_url(url).then_some(url)
}

/// Markdown to HTML with raw HTML in the source emitted as text and unsafe
/// link or image targets replaced by `#`.
pub fn markdown(source: &str) -> Markup {
    let parser = Parser::new(source).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) if !is_safe_url(&dest_url) => Event::Start(Tag::Link {
            link_type,
            dest_url: CowStr::Borrowed("#"),
            title,
            id,
        }),
        Event::Start(Tag::Image {
            link_type,
            dest_url,
            title,
            id,
        }) if !is_safe_url(&dest_url) => Event::Start(Tag::Image {
            link_type,
            dest_url: CowStr::Borrowed("#"),
            title,
            id,
        }),
        other => other,
    });
    let mut body_html = String::new();
    md_html::push_html(&mut body_html, parser);
    PreEscaped(body_html)
}

// ============================================================================
// Page Renderers
// ============================================================================

/// Home: hero, events carousel, pastor's welcome, weekly schedule.
pub fn render_home(layout: &Layout, carousel: &Carousel<CarouselItem>) -> Markup {
    let content = html! {
        section.hero.hero-home {
            h1 { "Welcome to " (layout.church.short_name) }
            p.hero-subtitle { (layout.church.name) }
            p.hero-lead {
                "Small enough for you to quickly get to meet others in fellowship, "
                "but big enough to provide pertinent ministry and educational opportunities."
            }
            div.hero-actions {
                a.button.button-light href="/visit" { "Plan Your Visit" }
                a.button.button-outline href="/contact" { "Get In Touch" }
            }
            div.service-badge {
                p.service-badge-label { "SUNDAY WORSHIP" }
                p.service-badge-time { "11:00 AM" }
            }
        }
        section.events-section {
            h2 { "Upcoming Events" }
            (render_carousel(carousel))
        }
        section.welcome {
            h2 { "A Word from Our Pastor" }
            blockquote.welcome-quote {
                p {
                    "\u{201c}If you are not greeted by at least three people, then we haven't "
                    "done what's right, and I wouldn't expect you to come back.\u{201d}"
                }
                p {
                    "This is our commitment to you. At " (layout.church.short_name)
                    ", we believe in genuine fellowship and making every visitor feel like "
                    "part of our church family."
                }
                footer { "Pastor Doug Reeder" br; span.muted { "Senior Pastor" } }
            }
        }
        section.why-visit {
            h2 { "Why Visit " (layout.church.short_name) "?" }
            div.card-grid {
                div.card {
                    h3 { "Strong Faith" }
                    p { "Grounded in the Bible, we proclaim the Good News of Jesus Christ with conviction and love." }
                }
                div.card {
                    h3 { "Real Community" }
                    p { "We're small enough to build genuine relationships and big enough to offer diverse ministries for your family." }
                }
                div.card {
                    h3 { "Spiritual Growth" }
                    p { "Through Bible study, discipleship, and prayer, we help you grow closer to God and His Word." }
                }
            }
        }
        section.schedule {
            h2 { "Our Weekly Schedule" }
            (render_schedule())
            p.center { a.button href="/visit" { "Learn More About Our Services" } }
        }
        section.cta {
            h2 { "Questions? We'd Love to Help!" }
            p { "Reach out to us anytime." }
            p.cta-phone { a href={ "tel:" (layout.church.phone) } { (layout.church.phone) } }
            a.button.button-light href="/contact" { "Send us a Message" }
        }
    };
    base_document(layout, "", "/", &["carousel.js"], content)
}

/// Initial carousel markup; `carousel.js` takes over from the data attributes.
pub fn render_carousel(carousel: &Carousel<CarouselItem>) -> Markup {
    let fixed = carousel
        .items()
        .first()
        .and_then(|item| serde_json::to_string(item).ok())
        .unwrap_or_default();
    html! {
        div.carousel id="events-carousel"
            data-feed="/api/events"
            data-interval=(carousel.interval().as_millis())
            data-autoplay=(if carousel.autoplay() { "true" } else { "false" })
            data-fixed=(fixed)
        {
            @if let Some(item) = carousel.current_item() {
                div.carousel-card {
                    button.carousel-nav.carousel-prev type="button" aria-label="Previous event" { "‹" }
                    div.carousel-icon { (item.image.as_deref().unwrap_or("📅")) }
                    button.carousel-nav.carousel-next type="button" aria-label="Next event" { "›" }
                    div.carousel-content {
                        h3.carousel-title { (item.name) }
                        p.carousel-time { "⏰ " (item.time) }
                        @if let Some(description) = &item.description {
                            p.carousel-description { (description) }
                        }
                    }
                }
            }
            div.carousel-indicators role="status" aria-live="polite" {
                @for i in 0..carousel.len() {
                    span.carousel-indicator.active[i == carousel.current()] {}
                }
            }
        }
    }
}

/// Weekly schedule grouped by day, from the fixed schedule.
fn render_schedule() -> Markup {
    let days = [Weekday::Sun, Weekday::Wed, Weekday::Thu];
    html! {
        div.schedule-grid {
            @for day in days {
                div.schedule-day {
                    h3 { (day_name(day)) }
                    ul {
                        @for slot in WEEKLY_SCHEDULE.iter().filter(|s| s.weekday == day) {
                            li {
                                span.schedule-name { (slot.name) }
                                span.schedule-time { (clock(slot.hour, slot.minute)) }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn day_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// 24-hour time as "5:30 PM".
fn clock(hour: u32, minute: u32) -> String {
    let (h, suffix) = match hour {
        0 => (12, "AM"),
        1..=11 => (hour, "AM"),
        12 => (12, "PM"),
        _ => (hour - 12, "PM"),
    };
    format!("{h}:{minute:02} {suffix}")
}

/// About: mission, history, and leadership grouped by role.
pub fn render_about(layout: &Layout, leadership: &[LeadershipRecord]) -> Markup {
    let pastors: Vec<&LeadershipRecord> =
        leadership.iter().filter(|l| l.has_position("Pastor")).collect();
    let deacons: Vec<&LeadershipRecord> =
        leadership.iter().filter(|l| l.has_position("Deacon")).collect();
    let trustees: Vec<&LeadershipRecord> =
        leadership.iter().filter(|l| l.has_position("Trustee")).collect();
    let others: Vec<&LeadershipRecord> = leadership.iter().filter(|l| l.rank() > 2).collect();

    let content = html! {
        (hero(&format!("About {}", layout.church.short_name),
            "Learn about our history, mission, and commitment to serving our community"))
        section.mission {
            h2 { "Our Mission" }
            blockquote.mission-statement {
                "Proclaim the Good News of Jesus Christ to all people; Promote the Spiritual "
                "Growth of Believers through the study of God's Holy Word, the Bible; and "
                "Provide spiritual support through Prayer, Discipleship, and Fellowship."
            }
        }
        section.history {
            h2 { "Our History" }
            div.timeline {
                div.timeline-item {
                    h3 { "Founded in 1984" }
                    p {
                        (layout.church.name) " was established with a vision to reach the "
                        "Painesville community with the Gospel of Jesus Christ and to build a "
                        "church family committed to biblical truth and genuine fellowship."
                    }
                }
                div.timeline-item {
                    h3 { "Community Impact" }
                    p {
                        "Through ministries like our Helping Hands Food Pantry, women's and men's "
                        "groups, and children's programs, we serve both our congregation and the "
                        "broader Painesville community."
                    }
                }
            }
        }
        section.leadership {
            h2 { "Our Leadership" }
            @for pastor in &pastors {
                article.leader-card.leader-pastor {
                    h3 { (pastor.name) }
                    p.leader-role { (pastor.position) }
                    @if let Some(bio) = &pastor.bio {
                        div.leader-bio { (markdown(bio)) }
                    }
                    (leader_contact(pastor))
                }
            }
            (leader_group("Deacons", &deacons))
            (leader_group("Trustees", &trustees))
            (leader_group("Other Leadership", &others))
        }
    };
    base_document(layout, "About", "/about", &[], content)
}

fn leader_group(heading: &str, people: &[&LeadershipRecord]) -> Markup {
    html! {
        @if !people.is_empty() {
            div.leader-group {
                h3 { (heading) }
                ul.leader-list {
                    @for person in people {
                        li {
                            span.leader-name { (person.name) }
                            @if person.rank() > 2 {
                                " " span.muted { (person.position) }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn leader_contact(person: &LeadershipRecord) -> Markup {
    html! {
        @if person.email.is_some() || person.phone.is_some() {
            p.leader-contact {
                @if let Some(email) = &person.email {
                    a href={ "mailto:" (email) } { (email) }
                }
                @if let Some(phone) = &person.phone {
                    " " a href={ "tel:" (phone) } { (phone) }
                }
            }
        }
    }
}

/// Visit: service times and a first-time visitor guide.
pub fn render_visit(layout: &Layout) -> Markup {
    let content = html! {
        (hero("Visit Us", "We'd love to welcome you to our church family"))
        section.schedule {
            h2 { "Our Service Times" }
            (render_schedule())
        }
        section.visitor-guide {
            h2 { "First-Time Visitor Guide" }
            div.card-grid {
                div.card {
                    h3 { "What to Expect" }
                    p { strong { "Warm Welcome: " } "Our members will greet you with genuine hospitality. Don't be surprised if you're greeted multiple times!" }
                    p { strong { "Children's Programs: " } "Nursery care and children's church are offered during the worship service." }
                    p { strong { "Worship Style: " } "We blend contemporary and traditional worship." }
                    p { strong { "Sermon Focus: " } "Our pastor teaches directly from the Bible, making it applicable to your life." }
                }
                div.card {
                    h3 { "Location & Parking" }
                    address {
                        @for line in &layout.church.address {
                            (line) br;
                        }
                    }
                    p { "Free parking in the front lot off Mentor Avenue and the rear lot off Hartshorn Drive." }
                    p {
                        "Having trouble finding us? Call "
                        a href={ "tel:" (layout.church.phone) } { (layout.church.phone) }
                        " and we'll give you directions."
                    }
                }
            }
        }
    };
    base_document(layout, "Plan Your Visit", "/visit", &[], content)
}

/// Ministries: one card per ministry, linked when it has a slug.
pub fn render_ministries(layout: &Layout, ministries: &[MinistryRecord]) -> Markup {
    let content = html! {
        (hero("Our Ministries", "Programs for every age and stage of life"))
        section.ministries {
            div.card-grid {
                @for ministry in ministries {
                    @let card = html! {
                        h3 { (ministry.name) }
                        @if let Some(audience) = &ministry.audience {
                            span.tag { (audience) }
                        }
                        p.card-summary { (ministry.description) }
                        @if let Some(times) = &ministry.meeting_times {
                            p.meeting-times { strong { "Meeting Times: " } (times) }
                        }
                    };
                    @if let Some(slug) = &ministry.slug {
                        a.card.card-link href={ "/ministries/" (slug) } {
                            (card)
                            span.card-more { "Learn More ›" }
                        }
                    } @else {
                        div.card { (card) }
                    }
                }
            }
        }
    };
    base_document(layout, "Ministries", "/ministries", &[], content)
}

/// Detail page for one ministry.
pub fn render_ministry(layout: &Layout, ministry: &MinistryRecord) -> Markup {
    let path = match &ministry.slug {
        Some(slug) => Page::Ministry(slug.clone()).path(),
        None => Page::Ministries.path(),
    };
    let content = html! {
        (hero(&ministry.name, ministry.audience.as_deref().unwrap_or_default()))
        article.ministry-detail {
            p.breadcrumb { a href="/ministries" { "‹ All Ministries" } }
            div.ministry-description { (markdown(&ministry.description)) }
            @if let Some(times) = &ministry.meeting_times {
                div.detail-block {
                    h2 { "Meeting Times" }
                    p { (times) }
                }
            }
            @if let Some(contact) = &ministry.leader_contact {
                div.detail-block {
                    h2 { "Contact" }
                    p { (contact) }
                }
            }
            p { a.button href="/contact" { "Ask About This Ministry" } }
        }
    };
    base_document(layout, &ministry.name, &path, &[], content)
}

/// Missions: the missionaries the church supports.
pub fn render_missions(layout: &Layout, missions: &[MissionRecord]) -> Markup {
    let content = html! {
        (hero("Missions", "Partnering with missionaries around the world spreading the Gospel"))
        section.missions {
            div.card-grid {
                @for missionary in missions {
                    article.card.missionary-card {
                        @if let Some(image) = missionary.image_path.as_deref().and_then(safe_url) {
                            img.missionary-photo src=(image) alt=(missionary.missionary_name) loading="lazy";
                        }
                        h3 { (missionary.missionary_name) }
                        p.missionary-location { (missionary.location) }
                        p.missionary-ministry { (missionary.ministry) }
                        @if let Some(description) = &missionary.description {
                            div.card-summary { (markdown(description)) }
                        }
                        @if let Some(url) = missionary.website_url().filter(|u| is_safe_url(u)) {
                            p { a href=(url) target="_blank" rel="noopener noreferrer" { "Website" } }
                        }
                        @if let Some(email) = &missionary.email {
                            p { a href={ "mailto:" (email) } { (email) } }
                        }
                    }
                }
            }
        }
    };
    base_document(layout, "Missions", "/missions", &[], content)
}

/// Sermons: archive grouped by year, newest year first.
pub fn render_sermons(layout: &Layout, sermons: &[SermonRecord]) -> Markup {
    let mut by_year: BTreeMap<i32, Vec<&SermonRecord>> = BTreeMap::new();
    for sermon in sermons {
        by_year.entry(sermon.date.year()).or_default().push(sermon);
    }
    let content = html! {
        (hero("Sermons", "Messages from Pastor Doug Reeder and guest speakers"))
        section.sermons {
            @if by_year.is_empty() {
                p.empty-state {
                    "Sermon recordings are on their way. Check back soon, or join us in person on Sunday at 11:00 AM."
                }
            }
            @for (year, group) in by_year.iter().rev() {
                div.sermon-year {
                    h2 { (year) }
                    ul.sermon-list {
                        @for sermon in group {
                            li.sermon {
                                @let link = sermon
                                    .video_link
                                    .as_deref()
                                    .or(sermon.download_link.as_deref())
                                    .and_then(safe_url);
                                h3 {
                                    @if let Some(url) = link {
                                        a href=(url) target="_blank" rel="noopener noreferrer" { (sermon.title) }
                                    } @else {
                                        (sermon.title)
                                    }
                                }
                                p.sermon-meta {
                                    (sermon.date.format("%B %-d, %Y").to_string())
                                    @if let Some(speaker) = &sermon.speaker {
                                        " · " (speaker)
                                    }
                                    @if let Some(series) = &sermon.series {
                                        " · " em { (series) }
                                    }
                                }
                                @if let Some(summary) = &sermon.summary {
                                    div.sermon-summary { (markdown(summary)) }
                                }
                            }
                        }
                    }
                }
            }
        }
    };
    base_document(layout, "Sermons", "/sermons", &[], content)
}

/// Contact: form plus church details. `form` refills the fields after a
/// failed submit; `notice` is the result line.
pub fn render_contact(layout: &Layout, form: &ContactForm, notice: Option<&FormNotice>) -> Markup {
    let content = html! {
        (hero("Contact Us", "We'd love to hear from you"))
        section.contact {
            div.contact-grid {
                form.contact-form method="post" action="/contact" {
                    @match notice {
                        Some(FormNotice::Success(msg)) => {
                            p.notice.notice-success role="status" { (msg) }
                        }
                        Some(FormNotice::Error(msg)) => {
                            p.notice.notice-error role="alert" { (msg) }
                        }
                        None => {}
                    }
                    label for="name" { "Name *" }
                    input id="name" type="text" name="name" required value=(form.name);
                    label for="email" { "Email *" }
                    input id="email" type="email" name="email" required value=(form.email);
                    label for="phone" { "Phone" }
                    input id="phone" type="tel" name="phone" value=(form.phone.as_deref().unwrap_or_default());
                    label for="message" { "Message *" }
                    textarea id="message" name="message" rows="6" required { (form.message) }
                    button.button type="submit" { "Send Message" }
                }
                div.contact-info {
                    h2 { "Church Information" }
                    address {
                        @for line in &layout.church.address {
                            (line) br;
                        }
                    }
                    p { a href={ "tel:" (layout.church.phone) } { (layout.church.phone) } }
                    p { a href={ "mailto:" (layout.church.email) } { (layout.church.email) } }
                    h3 { "Service Times" }
                    p { "Sunday School 10:00 AM" br; "Morning Worship 11:00 AM" }
                }
            }
        }
    };
    base_document(layout, "Contact", "/contact", &[], content)
}

pub fn render_not_found(layout: &Layout) -> Markup {
    let content = html! {
        (hero("Page Not Found", "We couldn't find what you were looking for"))
        section.not-found {
            p { a.button href="/" { "Back to Home" } }
        }
    };
    base_document(layout, "Not Found", "", &[], content)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{ContentKind, fallback};
    use crate::test_helpers::leader;
    use std::time::Duration;

    fn church() -> ChurchConfig {
        ChurchConfig::default()
    }

    fn layout(church: &ChurchConfig) -> Layout<'_> {
        Layout {
            church,
            build_id: "test",
        }
    }

    #[test]
    fn nav_marks_current_item() {
        let html = render_nav(&navigation(), "/missions").into_string();
        assert!(html.contains(r#"<li class="current"><a href="/missions">"#));
    }

    #[test]
    fn nav_home_not_current_on_other_pages() {
        assert!(!is_current_path("/", "/about"));
        assert!(is_current_path("/ministries", "/ministries/mens-ministry"));
        assert!(!is_current_path("/ministries", "/ministriesx"));
    }

    #[test]
    fn base_document_includes_doctype_and_assets() {
        let church = church();
        let doc = base_document(&layout(&church), "Test", "/", &["carousel.js"], html! { p { "x" } })
            .into_string();
        assert!(doc.starts_with("<!DOCTYPE html>"));
        assert!(doc.contains("<title>Test | Calvary Fellowship Baptist Church</title>"));
        assert!(doc.contains("/static/style.css?v=test"));
        assert!(doc.contains("/static/carousel.js?v=test"));
    }

    #[test]
    fn footer_shows_phone() {
        let church = church();
        let doc = render_visit(&layout(&church)).into_string();
        assert!(doc.contains("tel:(440) 354-8994"));
        assert!(doc.contains("727 Mentor Avenue"));
    }

    #[test]
    fn markdown_renders_but_escapes_raw_html() {
        let html = markdown("**bold** <script>alert(1)</script>").into_string();
        assert!(html.contains("<strong>bold</strong>"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn link_schemes_are_allowlisted() {
        for ok in ["https://cfbc.org", "HTTP://x.org", "mailto:a@b.org", "tel:440", "/visit", "#top"] {
            assert!(is_safe_url(ok), "{ok}");
        }
        for bad in ["javascript:alert(1)", " JavaScript:alert(1)", "data:text/html,x", "vbscript:x"] {
            assert!(!is_safe_url(bad), "{bad}");
        }
    }

    #[test]
    fn markdown_neutralizes_script_links() {
        let html = markdown("[click](javascript:alert(1)) and [site](https://cfbc.org)").into_string();
        assert!(!html.contains("javascript:"));
        assert!(html.contains(r##"<a href="#">click</a>"##));
        assert!(html.contains(r#"href="https://cfbc.org""#));
    }

    #[test]
    fn home_renders_fixed_slide() {
        let church = church();
        let mut carousel =
            Carousel::new(Some(CarouselItem::sunday_services()), Duration::from_secs(5), true);
        carousel.mount();
        let html = render_home(&layout(&church), &carousel).into_string();
        assert!(html.contains("Sunday Morning Services"));
        assert!(html.contains(r#"data-interval="5000""#));
        assert!(html.contains(r#"data-feed="/api/events""#));
        assert!(html.contains("carousel-indicator active"));
    }

    #[test]
    fn about_groups_leadership_in_role_order() {
        let church = church();
        let html = render_about(&layout(&church), &fallback::leadership()).into_string();
        let pastor = html.find("Pastor Doug Reeder").unwrap();
        let deacons = html.find("Deacons").unwrap();
        let trustees = html.find("Trustees").unwrap();
        assert!(pastor < deacons && deacons < trustees);
        assert!(html.contains("Liberty University"));
        assert!(!html.contains("Other Leadership"));
    }

    #[test]
    fn about_lists_unknown_roles_separately() {
        let church = church();
        let html = render_about(&layout(&church), &[leader("Sam", "Treasurer")]).into_string();
        assert!(html.contains("Other Leadership"));
        assert!(html.contains("Treasurer"));
    }

    #[test]
    fn ministries_link_only_when_slugged() {
        let church = church();
        let mut ministries = fallback::ministries();
        ministries[1].slug = None;
        let html = render_ministries(&layout(&church), &ministries).into_string();
        assert!(html.contains(r#"href="/ministries/727-student-ministry""#));
        assert!(!html.contains("/ministries/childrens-ministry"));
        assert!(html.contains("Children&#39;s Ministry") || html.contains("Children's Ministry"));
    }

    #[test]
    fn ministry_detail_shows_meeting_times() {
        let church = church();
        let ministry = &fallback::ministries()[6];
        let html = render_ministry(&layout(&church), ministry).into_string();
        assert!(html.contains("Helping Hands Food Pantry"));
        assert!(html.contains("Meeting Times"));
        assert!(html.contains("Open every Thursday"));
    }

    #[test]
    fn missions_render_website_with_scheme() {
        let church = church();
        let html = render_missions(&layout(&church), &fallback::missions()).into_string();
        assert!(html.contains("Norma Nulph"));
        assert!(html.contains(r#"href="https://www.freehope.org""#));
    }

    #[test]
    fn sermons_group_by_year_newest_first() {
        let church = church();
        let sermon = |title: &str, date: &str| {
            let record = crate::store::Record::new(
                title,
                crate::test_helpers::fields(serde_json::json!({
                    "Title": title, "Date": date, "Published": true
                })),
            );
            SermonRecord::from_record(&record).unwrap()
        };
        let sermons = vec![sermon("New", "2024-02-04"), sermon("Old", "2023-11-12")];
        let html = render_sermons(&layout(&church), &sermons).into_string();
        let y2024 = html.find("<h2>2024</h2>").unwrap();
        let y2023 = html.find("<h2>2023</h2>").unwrap();
        assert!(y2024 < y2023);
        assert!(html.contains("February 4, 2024"));
    }

    #[test]
    fn sermon_and_mission_links_drop_unsafe_targets() {
        let church = church();
        let record = crate::store::Record::new(
            "rec1",
            crate::test_helpers::fields(serde_json::json!({
                "Title": "Grace", "Date": "2024-02-04", "Published": true,
                "Video Link": "javascript:alert(1)"
            })),
        );
        let sermon = SermonRecord::from_record(&record).unwrap();
        let html = render_sermons(&layout(&church), &[sermon]).into_string();
        assert!(html.contains("Grace"));
        assert!(!html.contains("javascript:"));

        let mut mission = fallback::missions().remove(0);
        mission.image_path = Some("javascript:alert(1)".into());
        let html = render_missions(&layout(&church), &[mission]).into_string();
        assert!(!html.contains("javascript:"));
    }

    #[test]
    fn sermons_empty_state() {
        let church = church();
        let html = render_sermons(&layout(&church), &[]).into_string();
        assert!(html.contains("Check back soon"));
    }

    #[test]
    fn contact_form_refills_and_shows_notice() {
        let church = church();
        let form = ContactForm {
            name: "Ann".into(),
            email: "bad".into(),
            phone: None,
            message: "<b>hi</b>".into(),
        };
        let notice = FormNotice::Error("Please enter a valid email address.".into());
        let html = render_contact(&layout(&church), &form, Some(&notice)).into_string();
        assert!(html.contains(r#"value="Ann""#));
        assert!(html.contains("&lt;b&gt;hi&lt;/b&gt;"));
        assert!(html.contains("notice-error"));
    }

    #[test]
    fn clock_formats_twelve_hour() {
        assert_eq!(clock(17, 30), "5:30 PM");
        assert_eq!(clock(10, 0), "10:00 AM");
        assert_eq!(clock(12, 0), "12:00 PM");
    }

    #[test]
    fn html_escape_in_maud() {
        let items = vec![NavItem {
            title: "<script>alert('xss')</script>".to_string(),
            path: "/x".to_string(),
        }];
        let html = render_nav(&items, "/").into_string();
        assert!(!html.contains("<script>alert"));
        assert!(html.contains("&lt;script&gt;"));
    }
}
