//! Browser automation module
//!
//! This module provides high-level browser control through ChromiumOxide:
//! lifecycle management, quiescence-aware navigation and page rendering.

pub mod controller;
pub mod navigation;
pub mod renderer;

pub use controller::{BrowserConfig, BrowserController, PageHandle};
pub use navigation::{NavigationOptions, NavigationResult, PageNavigator, UrlValidator};
pub use renderer::{BrowserRenderer, PageRenderer, RenderedPage};
