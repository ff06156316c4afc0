//! Headless page layout
//!
//! Places every animated element of the portfolio page in a
//! [`HeadlessDocument`] with plausible document-space bounds, so the views
//! can be attached and scrolled without a browser.

use std::rc::Rc;

use folio_animation::{ElementRef, HeadlessDocument};

use crate::content::{
    Side, BENTO_CARDS, CONTACT_METHODS, FLOW_PATHS, PROJECTS, SKILL_CATEGORIES,
};
use crate::error::Result;
use crate::flow::FlowPath;

/// Total page height in pixels
pub const DOCUMENT_HEIGHT: f32 = 5600.0;

const HERO_TOP: f32 = 0.0;
const HERO_HEIGHT: f32 = 1700.0;
const BENTO_TOP: f32 = 900.0;
const BENTO_HEIGHT: f32 = 700.0;
const PROJECTS_TOP: f32 = 1700.0;
const PROJECTS_HEIGHT: f32 = 1400.0;
const SKILLS_TOP: f32 = 3100.0;
const SKILLS_HEIGHT: f32 = 1500.0;
const CONTACT_TOP: f32 = 4600.0;
const CONTACT_HEIGHT: f32 = 1000.0;
const NAV_HEIGHT: f32 = 64.0;
const PROJECT_CARD_HEIGHT: f32 = 400.0;

/// A decorative stroke and its full length
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlowLine {
    pub element: ElementRef,
    pub side: Side,
    pub length: f32,
}

/// A bento card and the fill bar inside it
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BentoCard {
    pub card: ElementRef,
    pub fill: ElementRef,
}

/// A content section whose children are revealed with a stagger
#[derive(Clone, Debug, PartialEq)]
pub struct Section {
    pub name: &'static str,
    pub element: ElementRef,
    pub items: Vec<ElementRef>,
}

/// The hoverable parts of a project card
///
/// `card` is the revealed item of the projects section; `frame` is the surface
/// inside it that lifts on hover, so the two never drive the same property.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectCard {
    pub card: ElementRef,
    pub frame: ElementRef,
    pub arrow: ElementRef,
}

/// A skill bar and the width it grows to
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SkillBar {
    pub element: ElementRef,
    pub level: f32,
}

/// Handles to every animated element on the page
#[derive(Clone, Debug, PartialEq)]
pub struct SiteElements {
    pub nav: ElementRef,
    pub indicator: ElementRef,
    pub flow_lines: Vec<FlowLine>,
    pub hero: ElementRef,
    pub hero_progress: ElementRef,
    pub bento: ElementRef,
    pub cards: Vec<BentoCard>,
    pub parallax: Vec<ElementRef>,
    pub projects: Section,
    /// Hover parts of each project card, in section item order
    pub project_cards: Vec<ProjectCard>,
    pub skills: Section,
    pub skill_bars: Vec<SkillBar>,
    pub contact: Section,
    pub buttons: Vec<ElementRef>,
}

impl SiteElements {
    /// Lay the page out into `doc`
    pub fn layout(doc: &HeadlessDocument) -> Result<Self> {
        let nav = doc.insert("nav", 0.0, NAV_HEIGHT);
        let indicator = doc.insert("scroll-indicator", 0.0, 4.0);

        let mut flow_lines = Vec::with_capacity(FLOW_PATHS.len());
        for (i, (side, d)) in FLOW_PATHS.iter().enumerate() {
            let length = FlowPath::parse(d)?.length();
            let label = match side {
                Side::Left => format!("left-flow-path-{i}"),
                Side::Right => format!("right-flow-path-{i}"),
            };
            flow_lines.push(FlowLine {
                element: doc.insert(label, 0.0, 2000.0),
                side: *side,
                length,
            });
        }

        let hero = doc.insert("hero", HERO_TOP, HERO_HEIGHT);
        let hero_progress = doc.insert("hero-progress", HERO_TOP + 100.0, HERO_HEIGHT - 200.0);

        let bento = doc.insert("bento", BENTO_TOP, BENTO_HEIGHT);
        let row_height = BENTO_HEIGHT / 3.0;
        let cards = BENTO_CARDS
            .iter()
            .enumerate()
            .map(|(i, title)| {
                let top = BENTO_TOP + (i / 2) as f32 * row_height;
                BentoCard {
                    card: doc.insert(format!("bento-card {title}"), top, row_height - 20.0),
                    fill: doc.insert(format!("card-fill {title}"), top + row_height - 40.0, 8.0),
                }
            })
            .collect();

        let parallax = [400.0, 2300.0, 4100.0]
            .iter()
            .enumerate()
            .map(|(i, top)| doc.insert(format!("parallax-element-{i}"), *top, 300.0))
            .collect();

        let mut project_cards = Vec::with_capacity(PROJECTS.len());
        for (i, title) in PROJECTS.iter().enumerate() {
            let top = PROJECTS_TOP + 150.0 + (i / 2) as f32 * 420.0;
            let arrow_top = top + PROJECT_CARD_HEIGHT - 60.0;
            project_cards.push(ProjectCard {
                card: doc.insert(format!("project {title}"), top, PROJECT_CARD_HEIGHT),
                frame: doc.insert(format!("project-frame {title}"), top, PROJECT_CARD_HEIGHT),
                arrow: doc.insert(format!("project-arrow {title}"), arrow_top, 24.0),
            });
        }
        let projects = Section {
            name: "projects",
            element: doc.insert("projects", PROJECTS_TOP, PROJECTS_HEIGHT),
            items: project_cards.iter().map(|p| p.card).collect(),
        };

        let skills = Section {
            name: "skills",
            element: doc.insert("skills", SKILLS_TOP, SKILLS_HEIGHT),
            items: SKILL_CATEGORIES
                .iter()
                .map(|c| doc.insert(format!("skill-tab {}", c.title), SKILLS_TOP + 150.0, 60.0))
                .collect(),
        };

        let skill_bars = SKILL_CATEGORIES
            .iter()
            .flat_map(|c| c.skills.iter())
            .enumerate()
            .map(|(j, s)| SkillBar {
                element: doc.insert(
                    format!("skill-bar {}", s.name),
                    SKILLS_TOP + 300.0 + j as f32 * 40.0,
                    8.0,
                ),
                level: s.level,
            })
            .collect();

        let contact = Section {
            name: "contact",
            element: doc.insert("contact", CONTACT_TOP, CONTACT_HEIGHT),
            items: CONTACT_METHODS
                .iter()
                .enumerate()
                .map(|(k, title)| {
                    let top = CONTACT_TOP + 200.0 + k as f32 * 150.0;
                    doc.insert(format!("contact {title}"), top, 120.0)
                })
                .collect(),
        };

        let buttons = [
            ("button hero-cta", 600.0),
            ("button hero-resume", 600.0),
            ("button projects-all", PROJECTS_TOP + PROJECTS_HEIGHT - 100.0),
            ("button contact-send", CONTACT_TOP + CONTACT_HEIGHT - 300.0),
        ]
        .iter()
        .map(|(label, top)| doc.insert(*label, *top, 56.0))
        .collect();

        tracing::debug!(elements = doc.elements().len(), "site laid out");

        Ok(Self {
            nav,
            indicator,
            flow_lines,
            hero,
            hero_progress,
            bento,
            cards,
            parallax,
            projects,
            project_cards,
            skills,
            skill_bars,
            contact,
            buttons,
        })
    }

    /// Fresh headless document of the page's height with the page laid out
    pub fn headless(viewport_height: f32) -> Result<(Rc<HeadlessDocument>, Self)> {
        let doc = Rc::new(HeadlessDocument::new(viewport_height, DOCUMENT_HEIGHT));
        let elements = Self::layout(&doc)?;
        Ok((doc, elements))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_animation::Host;

    #[test]
    fn test_layout_counts() {
        let (doc, site) = SiteElements::headless(1000.0).unwrap();
        assert_eq!(site.flow_lines.len(), 6);
        assert_eq!(site.cards.len(), 6);
        assert_eq!(site.projects.items.len(), 6);
        assert_eq!(site.project_cards.len(), 6);
        assert_eq!(site.skills.items.len(), 4);
        assert_eq!(site.skill_bars.len(), 27);
        assert_eq!(site.contact.items.len(), 3);
        assert_eq!(site.buttons.len(), 4);

        // every element is laid out with height
        for el in doc.elements() {
            let bounds = doc.bounds(el).unwrap();
            assert!(bounds.height > 0.0);
            assert!(bounds.bottom() <= DOCUMENT_HEIGHT);
        }
    }

    #[test]
    fn test_project_parts_sit_inside_their_cards() {
        let (doc, site) = SiteElements::headless(1000.0).unwrap();
        for (&item, parts) in site.projects.items.iter().zip(&site.project_cards) {
            assert_eq!(item, parts.card);
            let c = doc.bounds(parts.card).unwrap();
            for inner in [parts.frame, parts.arrow] {
                let b = doc.bounds(inner).unwrap();
                assert!(b.top >= c.top && b.bottom() <= c.bottom());
            }
        }
    }

    #[test]
    fn test_skill_bars_fit_their_section() {
        let (doc, site) = SiteElements::headless(1000.0).unwrap();
        let section = doc.bounds(site.skills.element).unwrap();
        for bar in &site.skill_bars {
            let b = doc.bounds(bar.element).unwrap();
            assert!(b.top >= section.top && b.bottom() <= section.bottom());
        }
    }
}
