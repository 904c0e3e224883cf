//! Shared types used by the renderers, the server, and the static export.

use crate::config::RevalidateConfig;
use serde::{Deserialize, Serialize};

/// One rendered page of the site.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Page {
    Home,
    About,
    Visit,
    Ministries,
    /// Detail page for the ministry with this slug.
    Ministry(String),
    Missions,
    Sermons,
    Contact,
}

impl Page {
    /// Pages with a fixed path, in navigation order.
    pub const FIXED: [Page; 7] = [
        Page::Home,
        Page::About,
        Page::Visit,
        Page::Ministries,
        Page::Missions,
        Page::Sermons,
        Page::Contact,
    ];

    /// URL path, always starting with `/`.
    pub fn path(&self) -> String {
        match self {
            Page::Home => "/".to_string(),
            Page::About => "/about".to_string(),
            Page::Visit => "/visit".to_string(),
            Page::Ministries => "/ministries".to_string(),
            Page::Ministry(slug) => format!("/ministries/{slug}"),
            Page::Missions => "/missions".to_string(),
            Page::Sermons => "/sermons".to_string(),
            Page::Contact => "/contact".to_string(),
        }
    }

    /// Nav label; detail pages are titled from their record instead.
    pub fn label(&self) -> &'static str {
        match self {
            Page::Home => "Home",
            Page::About => "About",
            Page::Visit => "Plan Your Visit",
            Page::Ministries | Page::Ministry(_) => "Ministries",
            Page::Missions => "Missions",
            Page::Sermons => "Sermons",
            Page::Contact => "Contact",
        }
    }

    /// Seconds a rendered copy stays fresh.
    pub fn revalidate(&self, config: &RevalidateConfig) -> u64 {
        match self {
            Page::Home => config.home,
            Page::About => config.about,
            Page::Visit => config.visit,
            Page::Ministries | Page::Ministry(_) => config.ministries,
            Page::Missions => config.missions,
            Page::Sermons => config.sermons,
            Page::Contact => config.contact,
        }
    }

    /// Relative file path in a static export: `index.html`,
    /// `about/index.html`, `ministries/mens-ministry/index.html`.
    pub fn output_file(&self) -> String {
        match self {
            Page::Home => "index.html".to_string(),
            other => format!("{}/index.html", other.path().trim_start_matches('/')),
        }
    }
}

/// Navigation bar entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavItem {
    pub title: String,
    pub path: String,
}

/// The site navigation, in display order.
pub fn navigation() -> Vec<NavItem> {
    Page::FIXED
        .iter()
        .map(|page| NavItem {
            title: page.label().to_string(),
            path: page.path(),
        })
        .collect()
}
