// src/navigation.rs

use actix_web::{web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};

/// Read access to the path the dashboard is currently showing.
pub trait CurrentPath {
    fn current_path(&self) -> &str;
}

impl CurrentPath for str {
    fn current_path(&self) -> &str {
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavItem {
    pub label: &'static str,
    pub path: &'static str,
    pub icon: &'static str,
}

/// Sidebar entries, top to bottom.
pub const NAV_ITEMS: &[NavItem] = &[
    NavItem {
        label: "Dashboard",
        path: "/",
        icon: "home",
    },
    NavItem {
        label: "Tasks",
        path: "/tasks",
        icon: "check-square",
    },
];

impl NavItem {
    /// The root entry only matches itself; any other entry also matches its sub-pages.
    pub fn is_active(&self, location: &(impl CurrentPath + ?Sized)) -> bool {
        let current = location.current_path();
        if current == self.path {
            return true;
        }
        self.path != "/"
            && current
                .strip_prefix(self.path)
                .is_some_and(|rest| rest.starts_with('/'))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavEntry {
    pub label: String,
    pub path: String,
    pub icon: String,
    pub active: bool,
}

pub fn nav_entries(location: &(impl CurrentPath + ?Sized)) -> Vec<NavEntry> {
    NAV_ITEMS
        .iter()
        .map(|item| NavEntry {
            label: item.label.to_string(),
            path: item.path.to_string(),
            icon: item.icon.to_string(),
            active: item.is_active(location),
        })
        .collect()
}

#[derive(Debug, Deserialize)]
pub struct NavigationQuery {
    #[serde(default)]
    pub path: Option<String>,
}

impl CurrentPath for NavigationQuery {
    fn current_path(&self) -> &str {
        self.path.as_deref().unwrap_or("/")
    }
}

/// GET /navigation?path=/tasks
pub async fn get_navigation(query: web::Query<NavigationQuery>) -> impl Responder {
    HttpResponse::Ok().json(nav_entries(&query.into_inner()))
}
