//! Scroll-linked views of the portfolio page
//!
//! Each view owns the element handles it animates and validates its trigger
//! anchors at construction. `bindings()` is then infallible and can be called
//! again on every re-mount.

use std::time::Duration;

use folio_animation::{
    AnimatedView, BindingSpec, Easing, ElementRef, HoverEffect, Property, ReplayPolicy,
    TriggerSpec,
};
use smallvec::SmallVec;

use crate::error::Result;
use crate::layout::{BentoCard, FlowLine, ProjectCard, Section, SkillBar};

/// Lag of the smoothed scrubs (`scrub: 1`)
const SCRUB_LAG: Duration = Duration::from_secs(1);

fn secs(s: f32) -> Duration {
    Duration::from_secs_f32(s)
}

/// Whole-page trigger shared by the flow lines and the progress bar
fn page_trigger() -> Result<TriggerSpec> {
    Ok(TriggerSpec::document("top top", "bottom bottom")?)
}

// ============================================================================
// Page-wide
// ============================================================================

/// Flow lines draw themselves as the page scrolls
#[derive(Clone, Debug)]
pub struct FlowLinesView {
    lines: Vec<FlowLine>,
    trigger: TriggerSpec,
}

impl FlowLinesView {
    pub fn new(lines: &[FlowLine]) -> Result<Self> {
        Ok(Self {
            lines: lines.to_vec(),
            trigger: page_trigger()?,
        })
    }
}

impl AnimatedView for FlowLinesView {
    fn name(&self) -> &str {
        "flow-lines"
    }

    fn bindings(&self) -> Vec<BindingSpec> {
        self.lines
            .iter()
            .map(|line| {
                BindingSpec::scrub(line.element, Property::StrokeDashOffset, line.length, 0.0)
                    .easing(Easing::PowerInOut(2))
                    .trigger(self.trigger)
                    .smoothed(SCRUB_LAG)
            })
            .collect()
    }
}

/// Top-of-page progress bar
#[derive(Clone, Debug)]
pub struct ScrollProgressView {
    bar: ElementRef,
    trigger: TriggerSpec,
}

impl ScrollProgressView {
    pub fn new(bar: ElementRef) -> Result<Self> {
        Ok(Self {
            bar,
            trigger: page_trigger()?,
        })
    }
}

impl AnimatedView for ScrollProgressView {
    fn name(&self) -> &str {
        "scroll-progress"
    }

    fn bindings(&self) -> Vec<BindingSpec> {
        vec![BindingSpec::scrub(self.bar, Property::ScaleX, 0.0, 1.0).trigger(self.trigger)]
    }
}

/// Elements drifting upward at half their height across the viewport
#[derive(Clone, Debug)]
pub struct ParallaxView {
    elements: Vec<(ElementRef, TriggerSpec)>,
}

impl ParallaxView {
    pub fn new(elements: &[ElementRef]) -> Result<Self> {
        let elements = elements
            .iter()
            .map(|&el| Ok((el, TriggerSpec::element(el, "top bottom", "bottom top")?)))
            .collect::<Result<_>>()?;
        Ok(Self { elements })
    }
}

impl AnimatedView for ParallaxView {
    fn name(&self) -> &str {
        "parallax"
    }

    fn bindings(&self) -> Vec<BindingSpec> {
        self.elements
            .iter()
            .map(|&(el, trigger)| {
                BindingSpec::scrub(el, Property::YPercent, 0.0, -50.0).trigger(trigger)
            })
            .collect()
    }
}

// ============================================================================
// Hero
// ============================================================================

/// Vertical progress line beside the hero and about grid
#[derive(Clone, Debug)]
pub struct HeroView {
    progress: ElementRef,
    trigger: TriggerSpec,
}

impl HeroView {
    pub fn new(container: ElementRef, progress: ElementRef) -> Result<Self> {
        Ok(Self {
            progress,
            trigger: TriggerSpec::element(container, "top 80%", "bottom 20%")?,
        })
    }
}

impl AnimatedView for HeroView {
    fn name(&self) -> &str {
        "hero"
    }

    fn bindings(&self) -> Vec<BindingSpec> {
        vec![
            BindingSpec::scrub(self.progress, Property::HeightPercent, 0.0, 100.0)
                .easing(Easing::PowerInOut(2))
                .trigger(self.trigger)
                .smoothed(SCRUB_LAG),
        ]
    }
}

/// About grid: cards pop in with a stagger and play back out when scrolled
/// above, each card's fill bar follows its own scroll window
#[derive(Clone, Debug)]
pub struct BentoView {
    cards: Vec<(BentoCard, TriggerSpec)>,
    container_trigger: TriggerSpec,
}

impl BentoView {
    const STAGGER: f32 = 0.2;
    const DURATION: f32 = 0.8;

    pub fn new(container: ElementRef, cards: &[BentoCard]) -> Result<Self> {
        let cards = cards
            .iter()
            .map(|&card| Ok((card, TriggerSpec::element(card.card, "top 80%", "bottom 60%")?)))
            .collect::<Result<_>>()?;
        Ok(Self {
            cards,
            container_trigger: TriggerSpec::element(container, "top 70%", "bottom 30%")?,
        })
    }
}

impl AnimatedView for BentoView {
    fn name(&self) -> &str {
        "bento"
    }

    fn bindings(&self) -> Vec<BindingSpec> {
        let duration = secs(Self::DURATION);
        let mut specs = Vec::with_capacity(self.cards.len() * 4);

        for (i, &(card, fill_trigger)) in self.cards.iter().enumerate() {
            let delay = secs(i as f32 * Self::STAGGER);
            let pop = [
                (Property::Opacity, 0.0, 1.0),
                (Property::TranslateY, 50.0, 0.0),
                (Property::Scale, 0.9, 1.0),
            ];
            specs.extend(pop.into_iter().map(|(property, from, to)| {
                BindingSpec::once(card.card, property, from, to, duration)
                    .easing(Easing::PowerOut(2))
                    .trigger(self.container_trigger)
                    .delay(delay)
                    .policy(ReplayPolicy::Reverse)
            }));

            specs.push(
                BindingSpec::scrub(card.fill, Property::ScaleX, 0.0, 1.0)
                    .easing(Easing::PowerInOut(2))
                    .trigger(fill_trigger)
                    .smoothed(SCRUB_LAG),
            );
        }
        specs
    }
}

// ============================================================================
// Content sections
// ============================================================================

/// Fade a section in and rise its children one after another
#[derive(Clone, Debug)]
pub struct SectionRevealView {
    section: Section,
    trigger: TriggerSpec,
}

impl SectionRevealView {
    const STAGGER: f32 = 0.1;

    pub fn new(section: &Section) -> Result<Self> {
        Ok(Self {
            section: section.clone(),
            trigger: TriggerSpec::element(section.element, "top bottom-=100", "bottom top")?,
        })
    }
}

impl AnimatedView for SectionRevealView {
    fn name(&self) -> &str {
        self.section.name
    }

    fn bindings(&self) -> Vec<BindingSpec> {
        let mut specs = Vec::with_capacity(1 + self.section.items.len() * 2);
        specs.push(
            BindingSpec::once(self.section.element, Property::Opacity, 0.0, 1.0, secs(0.8))
                .easing(Easing::EaseOut)
                .trigger(self.trigger)
                .policy(ReplayPolicy::Freeze),
        );

        for (i, &item) in self.section.items.iter().enumerate() {
            let delay = secs(i as f32 * Self::STAGGER);
            for (property, from) in [(Property::Opacity, 0.0), (Property::TranslateY, 50.0)] {
                let to = if property == Property::Opacity { 1.0 } else { 0.0 };
                specs.push(
                    BindingSpec::once(item, property, from, to, secs(0.6))
                        .easing(Easing::EaseOut)
                        .trigger(self.trigger)
                        .delay(delay)
                        .policy(ReplayPolicy::Freeze),
                );
            }
        }
        specs
    }
}

/// Skill bars grow to their level the first time the section shows
#[derive(Clone, Debug)]
pub struct SkillBarsView {
    bars: Vec<SkillBar>,
    trigger: TriggerSpec,
}

impl SkillBarsView {
    pub fn new(section: ElementRef, bars: &[SkillBar]) -> Result<Self> {
        Ok(Self {
            bars: bars.to_vec(),
            trigger: TriggerSpec::element(section, "top bottom-=100", "bottom top")?,
        })
    }
}

impl AnimatedView for SkillBarsView {
    fn name(&self) -> &str {
        "skill-bars"
    }

    fn bindings(&self) -> Vec<BindingSpec> {
        self.bars
            .iter()
            .map(|bar| {
                BindingSpec::once(bar.element, Property::WidthPercent, 0.0, bar.level, secs(1.5))
                    .easing(Easing::EaseOut)
                    .trigger(self.trigger)
                    .delay(secs(0.2))
                    .policy(ReplayPolicy::Freeze)
            })
            .collect()
    }
}

// ============================================================================
// Pointer
// ============================================================================

/// Buttons that grow slightly and lean toward the pointer
#[derive(Clone, Debug)]
pub struct MagneticButtonsView {
    buttons: SmallVec<[ElementRef; 4]>,
}

impl MagneticButtonsView {
    const STRENGTH: f32 = 0.05;
    const DURATION: f32 = 0.2;

    pub fn new(buttons: &[ElementRef]) -> Self {
        Self {
            buttons: buttons.iter().copied().collect(),
        }
    }
}

impl AnimatedView for MagneticButtonsView {
    fn name(&self) -> &str {
        "magnetic-buttons"
    }

    fn bindings(&self) -> Vec<BindingSpec> {
        let duration = secs(Self::DURATION);
        let magnetic = HoverEffect::Magnetic {
            strength: Self::STRENGTH,
            duration,
        };

        self.buttons
            .iter()
            .flat_map(|&button| {
                [
                    BindingSpec::hover(
                        button,
                        Property::Scale,
                        1.0,
                        1.02,
                        HoverEffect::Toggle { duration },
                    ),
                    BindingSpec::hover(button, Property::TranslateX, 0.0, 0.0, magnetic),
                    BindingSpec::hover(button, Property::TranslateY, 0.0, 0.0, magnetic),
                ]
            })
            .map(|spec| spec.easing(Easing::PowerOut(2)))
            .collect()
    }
}

/// Project cards lift while hovered and nudge their arrow to the right
#[derive(Clone, Debug)]
pub struct ProjectHoverView {
    cards: Vec<ProjectCard>,
}

impl ProjectHoverView {
    const DURATION: f32 = 0.2;
    const SCALE: f32 = 1.02;
    const LIFT: f32 = -5.0;
    const ARROW_SHIFT: f32 = 4.0;

    pub fn new(cards: &[ProjectCard]) -> Self {
        Self {
            cards: cards.to_vec(),
        }
    }
}

impl AnimatedView for ProjectHoverView {
    fn name(&self) -> &str {
        "project-hover"
    }

    fn bindings(&self) -> Vec<BindingSpec> {
        let toggle = HoverEffect::Toggle {
            duration: secs(Self::DURATION),
        };

        self.cards
            .iter()
            .flat_map(|parts| {
                let frame = parts.frame;
                let arrow = parts.arrow;
                [
                    BindingSpec::hover(frame, Property::Scale, 1.0, Self::SCALE, toggle),
                    BindingSpec::hover(frame, Property::TranslateY, 0.0, Self::LIFT, toggle),
                    BindingSpec::hover(arrow, Property::TranslateX, 0.0, Self::ARROW_SHIFT, toggle),
                ]
                .map(|spec| spec.hovered_by(parts.card))
            })
            .map(|spec| spec.easing(Easing::PowerOut(2)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::SiteElements;
    use folio_animation::Mode;

    #[test]
    fn test_binding_counts() {
        let (_doc, site) = SiteElements::headless(1000.0).unwrap();

        assert_eq!(FlowLinesView::new(&site.flow_lines).unwrap().bindings().len(), 6);
        assert_eq!(BentoView::new(site.bento, &site.cards).unwrap().bindings().len(), 24);
        assert_eq!(SectionRevealView::new(&site.projects).unwrap().bindings().len(), 13);
        let skill_bars = SkillBarsView::new(site.skills.element, &site.skill_bars).unwrap();
        assert_eq!(skill_bars.bindings().len(), 27);
        assert_eq!(MagneticButtonsView::new(&site.buttons).bindings().len(), 12);
        assert_eq!(ProjectHoverView::new(&site.project_cards).bindings().len(), 18);
    }

    #[test]
    fn test_keys_are_unique_within_a_view() {
        let (_doc, site) = SiteElements::headless(1000.0).unwrap();
        let specs = BentoView::new(site.bento, &site.cards).unwrap().bindings();
        let mut keys: Vec<_> = specs.iter().map(|s| s.key()).collect();
        keys.sort_by_key(|k| (k.element.to_raw(), k.property.name()));
        keys.dedup();
        assert_eq!(keys.len(), specs.len());
    }

    #[test]
    fn test_bento_stagger() {
        let (_doc, site) = SiteElements::headless(1000.0).unwrap();
        let specs = BentoView::new(site.bento, &site.cards).unwrap().bindings();
        let delays: Vec<_> = specs
            .iter()
            .filter(|s| s.property == Property::Opacity)
            .map(|s| match s.mode {
                Mode::Once(once) => once.delay,
                other => panic!("unexpected mode {other:?}"),
            })
            .collect();
        assert_eq!(delays.len(), 6);
        assert_eq!(delays[0], Duration::ZERO);
        assert!(delays.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn test_magnetic_buttons_are_hover_only() {
        let (_doc, site) = SiteElements::headless(1000.0).unwrap();
        let view = MagneticButtonsView::new(&site.buttons);
        assert!(view.bindings().iter().all(|s| !s.mode.needs_range()));
    }

    #[test]
    fn test_project_hover_is_driven_by_the_card() {
        let (_doc, site) = SiteElements::headless(1000.0).unwrap();
        let specs = ProjectHoverView::new(&site.project_cards).bindings();
        for (parts, chunk) in site.project_cards.iter().zip(specs.chunks(3)) {
            assert!(chunk.iter().all(|s| s.hover_element() == parts.card));
            assert!(chunk.iter().all(|s| s.target != parts.card));
            assert_eq!(chunk[2].target, parts.arrow);
            assert_eq!(chunk[2].tween.to, 4.0);
        }
    }

    #[test]
    fn test_project_hover_does_not_collide_with_reveal() {
        let (_doc, site) = SiteElements::headless(1000.0).unwrap();
        let reveal: Vec<_> = SectionRevealView::new(&site.projects)
            .unwrap()
            .bindings()
            .iter()
            .map(|s| s.key())
            .collect();
        let hover = ProjectHoverView::new(&site.project_cards).bindings();
        assert!(hover.iter().all(|s| !reveal.contains(&s.key())));
    }
}
