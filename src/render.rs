//! Page rendering with content resolution, and the static export.
//!
//! [`SiteContext`] owns everything a page needs besides the request: the
//! loaded config, the [`ContentResolver`], and the stylesheet with the
//! configured colors prepended. The server renders through it on cache
//! misses; `cfbc-site render` walks every page through it once and writes
//! the result to disk:
//!
//! ```text
//! dist/
//! ├── index.html
//! ├── about/index.html
//! ├── ministries/index.html
//! ├── ministries/mens-ministry/index.html
//! ├── ...
//! ├── 404.html
//! ├── api/events               # carousel feed, JSON
//! └── static/
//!     ├── style.css
//!     └── carousel.js
//! ```

use crate::carousel::{Carousel, CarouselItem, events_feed};
use crate::config::{SiteConfig, generate_color_css};
use crate::contact::ContactForm;
use crate::content::{
    ContentResolver, EventRecord, LeadershipRecord, MinistryRecord, MissionRecord, Resolved,
    SermonRecord, Source, find_ministry,
};
use crate::naming::is_slug;
use crate::pages::{self, FormNotice, Layout};
use crate::store::Table;
use crate::types::Page;
use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const STYLE_CSS: &str = include_str!("../static/style.css");
pub const CAROUSEL_JS: &str = include_str!("../static/carousel.js");

/// Cache-busting id baked in at build time.
pub const BUILD_ID: &str = env!("SITE_BUILD_ID");

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to encode events feed: {0}")]
    Json(#[from] serde_json::Error),
}

/// One rendered page and where its content came from.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub html: String,
    /// `None` for pages without store-backed content.
    pub source: Option<Source>,
}

/// How one content kind currently resolves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentStatus {
    pub table: Table,
    pub count: usize,
    pub source: Source,
}

pub struct SiteContext {
    pub config: SiteConfig,
    pub resolver: ContentResolver,
    css: String,
    build_id: String,
}

impl SiteContext {
    pub fn new(config: SiteConfig, resolver: ContentResolver) -> Self {
        let css = format!("{}\n\n{}", generate_color_css(&config.colors), STYLE_CSS);
        Self {
            config,
            resolver,
            css,
            build_id: BUILD_ID.to_string(),
        }
    }

    fn layout(&self) -> Layout<'_> {
        Layout {
            church: &self.config.church,
            build_id: &self.build_id,
        }
    }

    pub fn build_id(&self) -> &str {
        &self.build_id
    }

    /// Stylesheet with the color variables prepended.
    pub fn style_css(&self) -> &str {
        &self.css
    }

    /// Render one page. `None` when the page does not exist, which only
    /// happens for a ministry slug with no matching ministry.
    pub async fn render_page(&self, page: &Page) -> Option<RenderedPage> {
        let layout = self.layout();
        let rendered = match page {
            Page::Home => {
                let mut carousel =
                    Carousel::from_config(Some(CarouselItem::sunday_services()), &self.config.carousel);
                carousel.mount();
                RenderedPage {
                    html: pages::render_home(&layout, &carousel).into_string(),
                    source: None,
                }
            }
            Page::About => {
                let leaders = self.resolver.resolve::<LeadershipRecord>().await;
                RenderedPage {
                    html: pages::render_about(&layout, &leaders.items).into_string(),
                    source: Some(leaders.source),
                }
            }
            Page::Visit => RenderedPage {
                html: pages::render_visit(&layout).into_string(),
                source: None,
            },
            Page::Ministries | Page::Ministry(_) => {
                let ministries = self.resolver.resolve::<MinistryRecord>().await;
                return self.render_ministry_page(page, &ministries);
            }
            Page::Missions => {
                let missions = self.resolver.resolve::<MissionRecord>().await;
                RenderedPage {
                    html: pages::render_missions(&layout, &missions.items).into_string(),
                    source: Some(missions.source),
                }
            }
            Page::Sermons => {
                let sermons = self.resolver.resolve::<SermonRecord>().await;
                RenderedPage {
                    html: pages::render_sermons(&layout, &sermons.items).into_string(),
                    source: Some(sermons.source),
                }
            }
            Page::Contact => RenderedPage {
                html: self.render_contact(&ContactForm::default(), None),
                source: None,
            },
        };
        Some(rendered)
    }

    /// The ministries index or one detail page, from an already resolved
    /// set. `None` for any other page or an unknown slug.
    fn render_ministry_page(
        &self,
        page: &Page,
        ministries: &Resolved<MinistryRecord>,
    ) -> Option<RenderedPage> {
        let layout = self.layout();
        let html = match page {
            Page::Ministries => pages::render_ministries(&layout, &ministries.items),
            Page::Ministry(slug) => {
                pages::render_ministry(&layout, find_ministry(&ministries.items, slug)?)
            }
            _ => return None,
        };
        Some(RenderedPage {
            html: html.into_string(),
            source: Some(ministries.source),
        })
    }

    pub fn render_contact(&self, form: &ContactForm, notice: Option<&FormNotice>) -> String {
        pages::render_contact(&self.layout(), form, notice).into_string()
    }

    pub fn render_not_found(&self) -> String {
        pages::render_not_found(&self.layout()).into_string()
    }

    /// Carousel slides after the fixed first one.
    pub async fn events(&self, now: DateTime<Utc>) -> (Vec<CarouselItem>, Source) {
        let events = self.resolver.resolve::<EventRecord>().await;
        let items = events_feed(&events.items, now, self.config.carousel.max_items);
        (items, events.source)
    }

    /// Every fixed page plus one detail page per slugged ministry.
    pub async fn all_pages(&self) -> Vec<Page> {
        let mut all: Vec<Page> = Page::FIXED.to_vec();
        let ministries = self.resolver.resolve::<MinistryRecord>().await;
        all.extend(detail_pages(&ministries.items));
        all
    }

    /// Resolution outcome for every content kind, for `check`.
    pub async fn content_status(&self) -> Vec<ContentStatus> {
        let leaders = self.resolver.resolve::<LeadershipRecord>().await;
        let ministries = self.resolver.resolve::<MinistryRecord>().await;
        let missions = self.resolver.resolve::<MissionRecord>().await;
        let sermons = self.resolver.resolve::<SermonRecord>().await;
        let events = self.resolver.resolve::<EventRecord>().await;
        vec![
            status(Table::Leadership, leaders.items.len(), leaders.source),
            status(Table::Ministries, ministries.items.len(), ministries.source),
            status(Table::Missions, missions.items.len(), missions.source),
            status(Table::Sermons, sermons.items.len(), sermons.source),
            status(Table::Events, events.items.len(), events.source),
        ]
    }
}

/// Detail pages for ministries whose slug is usable as a path segment.
fn detail_pages(ministries: &[MinistryRecord]) -> impl Iterator<Item = Page> + '_ {
    ministries
        .iter()
        .filter_map(|m| m.slug.as_deref())
        .filter(|slug| is_slug(slug))
        .map(|slug| Page::Ministry(slug.to_string()))
}

fn status(table: Table, count: usize, source: Source) -> ContentStatus {
    ContentStatus {
        table,
        count,
        source,
    }
}

// ============================================================================
// Static export
// ============================================================================

#[derive(Debug, Clone)]
pub struct ExportedPage {
    pub path: String,
    pub file: String,
    pub source: Option<Source>,
}

#[derive(Debug, Clone, Default)]
pub struct RenderReport {
    pub pages: Vec<ExportedPage>,
    /// Relative paths of non-page files written.
    pub assets: Vec<String>,
}

fn write_file(out_dir: &Path, relative: &str, contents: &str) -> Result<(), RenderError> {
    let path = out_dir.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| RenderError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(&path, contents).map_err(|source| RenderError::Io { path, source })
}

/// Render the whole site into `out_dir`.
pub async fn render_site(
    site: &SiteContext,
    out_dir: &Path,
    now: DateTime<Utc>,
) -> Result<RenderReport, RenderError> {
    let mut report = RenderReport::default();

    // Ministries are read once for the index and every detail page.
    let ministries = site.resolver.resolve::<MinistryRecord>().await;
    let site_pages = Page::FIXED
        .into_iter()
        .chain(detail_pages(&ministries.items));
    for page in site_pages {
        let rendered = match page {
            Page::Ministries | Page::Ministry(_) => site.render_ministry_page(&page, &ministries),
            _ => site.render_page(&page).await,
        };
        let Some(rendered) = rendered else {
            continue;
        };
        let file = page.output_file();
        write_file(out_dir, &file, &rendered.html)?;
        tracing::info!(path = %page.path(), "rendered");
        report.pages.push(ExportedPage {
            path: page.path(),
            file,
            source: rendered.source,
        });
    }

    let (events, _) = site.events(now).await;
    let assets = [
        ("404.html", site.render_not_found()),
        ("api/events", serde_json::to_string(&events)?),
        ("static/style.css", site.style_css().to_string()),
        ("static/carousel.js", CAROUSEL_JS.to_string()),
    ];
    for (relative, contents) in assets {
        write_file(out_dir, relative, &contents)?;
        report.assets.push(relative.to_string());
    }

    Ok(report)
}
