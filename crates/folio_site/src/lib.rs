//! Folio Site
//!
//! The portfolio page expressed as scroll-linked views on top of
//! `folio_animation`.
//!
//! # Features
//!
//! - **Content**: Skill levels, card and project lists, flow line paths
//! - **Layout**: Headless placement of every animated element
//! - **Views**: Flow lines, hero progress, bento grid, parallax, section reveals,
//!   skill bars, project card hover and magnetic buttons
//! - **Indicator**: Threshold-driven scroll indicator visibility
//! - **Nav**: Navigation backdrop shown once the page leaves the top
//!
//! # Example
//!
//! ```ignore
//! use std::rc::Rc;
//! use folio_animation::{EngineConfig, ScrollEngine};
//! use folio_site::{mount_site, SiteElements};
//!
//! let (doc, site) = SiteElements::headless(1000.0)?;
//! let engine = ScrollEngine::new(doc.clone(), EngineConfig::default());
//! let mount = mount_site(&engine, doc.clone(), &site)?;
//! ```

pub mod content;
pub mod error;
pub mod flow;
pub mod indicator;
pub mod layout;
pub mod nav;
pub mod views;

use std::rc::Rc;

use folio_animation::{
    AnimatedView, AttachReport, Host, MountGuard, ScrollEngine, Subscription,
};

pub use error::{Result, SiteError};
pub use flow::FlowPath;
pub use indicator::IndicatorVisibility;
pub use layout::{
    BentoCard, FlowLine, ProjectCard, Section, SiteElements, SkillBar, DOCUMENT_HEIGHT,
};
pub use nav::NavBackdrop;
pub use views::{
    BentoView, FlowLinesView, HeroView, MagneticButtonsView, ParallaxView, ProjectHoverView,
    ScrollProgressView, SectionRevealView, SkillBarsView,
};

/// One mounted view
#[derive(Debug)]
pub struct MountedView {
    pub name: String,
    pub report: AttachReport,
    guard: MountGuard,
}

impl MountedView {
    pub fn binding_count(&self) -> usize {
        self.guard.handle().binding_count()
    }
}

/// Every view of the page, released together on drop
#[derive(Debug)]
pub struct SiteMount {
    views: Vec<MountedView>,
    indicator: Rc<IndicatorVisibility>,
    nav: Rc<NavBackdrop>,
    _subscriptions: Vec<Subscription>,
}

impl SiteMount {
    pub fn views(&self) -> &[MountedView] {
        &self.views
    }

    pub fn indicator(&self) -> &IndicatorVisibility {
        &self.indicator
    }

    pub fn nav(&self) -> &NavBackdrop {
        &self.nav
    }

    /// Bindings registered across all views
    pub fn attached(&self) -> usize {
        self.views.iter().map(|v| v.report.attached).sum()
    }

    /// Bindings still waiting for their trigger to resolve
    pub fn pending(&self) -> usize {
        self.views.iter().map(|v| v.report.pending).sum()
    }

    /// Release every view and stop the threshold subscribers
    pub fn unmount(self) {
        drop(self);
    }
}

fn mount(engine: &ScrollEngine, view: &dyn AnimatedView) -> Result<MountedView> {
    let guard = MountGuard::new(engine);
    let report = guard.mount(view)?;
    tracing::debug!(
        view = view.name(),
        attached = report.attached,
        pending = report.pending,
        "view mounted"
    );
    Ok(MountedView {
        name: view.name().to_string(),
        report,
        guard,
    })
}

/// Mount the whole page on `engine`
///
/// Views already mounted stay mounted if a later one fails; they are released
/// when the error drops them.
pub fn mount_site(
    engine: &ScrollEngine,
    host: Rc<dyn Host>,
    site: &SiteElements,
) -> Result<SiteMount> {
    let views: Vec<Box<dyn AnimatedView>> = vec![
        Box::new(ScrollProgressView::new(site.indicator)?),
        Box::new(FlowLinesView::new(&site.flow_lines)?),
        Box::new(HeroView::new(site.hero, site.hero_progress)?),
        Box::new(BentoView::new(site.bento, &site.cards)?),
        Box::new(ParallaxView::new(&site.parallax)?),
        Box::new(SectionRevealView::new(&site.projects)?),
        Box::new(ProjectHoverView::new(&site.project_cards)),
        Box::new(SectionRevealView::new(&site.skills)?),
        Box::new(SkillBarsView::new(site.skills.element, &site.skill_bars)?),
        Box::new(SectionRevealView::new(&site.contact)?),
        Box::new(MagneticButtonsView::new(&site.buttons)),
    ];

    let mounted = views
        .iter()
        .map(|view| mount(engine, view.as_ref()))
        .collect::<Result<Vec<_>>>()?;

    let indicator = IndicatorVisibility::new(Rc::clone(&host), site.indicator);
    let nav = NavBackdrop::new(host, site.nav);
    let subscriptions = vec![indicator.subscribe(engine)?, nav.subscribe(engine)?];
    engine.refresh();

    let site_mount = SiteMount {
        views: mounted,
        indicator,
        nav,
        _subscriptions: subscriptions,
    };
    tracing::info!(
        views = site_mount.views.len(),
        attached = site_mount.attached(),
        pending = site_mount.pending(),
        "site mounted"
    );
    Ok(site_mount)
}
