//! Static page content that drives animation parameters
//!
//! Only the data the animations read lives here: skill levels become bar
//! widths, card and project counts decide how many staggered bindings a view
//! registers, and the flow line paths decide stroke lengths.

/// One skill and its proficiency in percent
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Skill {
    pub name: &'static str,
    pub level: f32,
}

/// A tab in the skills section
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SkillCategory {
    pub title: &'static str,
    pub skills: &'static [Skill],
}

const fn skill(name: &'static str, level: f32) -> Skill {
    Skill { name, level }
}

pub static SKILL_CATEGORIES: &[SkillCategory] = &[
    SkillCategory {
        title: "Frontend Development",
        skills: &[
            skill("React", 95.0),
            skill("Next.js", 90.0),
            skill("TypeScript", 88.0),
            skill("Tailwind CSS", 92.0),
            skill("GSAP, Three.JS", 75.0),
            skill("Framer Motion", 85.0),
        ],
    },
    SkillCategory {
        title: "Backend Development",
        skills: &[
            skill("Node.js", 90.0),
            skill("C++ for Web", 85.0),
            skill("PostgreSQL", 88.0),
            skill("MongoDB", 80.0),
            skill("Next.JS", 75.0),
            skill("REST APIs", 92.0),
            skill("WebRTC", 80.0),
            skill("WebSockets", 75.0),
            skill("Payment Gateways", 92.0),
        ],
    },
    SkillCategory {
        title: "Cloud & DevOps",
        skills: &[
            skill("AWS", 82.0),
            skill("Docker", 85.0),
            skill("Vercel", 90.0),
            skill("GitHub Actions", 78.0),
            skill("Kubernetes", 70.0),
            skill("CI/CD", 65.0),
        ],
    },
    SkillCategory {
        title: "Low Level Programming",
        skills: &[
            skill("C++", 20.0),
            skill("Git", 82.0),
            skill("Operating Systems", 20.0),
            skill("Browser Engineering", 65.0),
            skill("Computer Networks", 78.0),
            skill("CLIs", 82.0),
        ],
    },
];

/// Bento card titles in the about grid
pub static BENTO_CARDS: &[&str] = &[
    "ABOUT ME",
    "TECHNOLOGIES",
    "FRONTEND",
    "BACKEND",
    "Low Level Shi",
    "CLOUD & DEVOPS",
];

pub static PROJECTS: &[&str] = &[
    "E-Commerce Platform",
    "Task Management App",
    "Design System Library",
    "Mobile Fitness App",
    "Open Source CLI Tool",
    "Analytics Dashboard",
];

pub static CONTACT_METHODS: &[&str] = &["Email", "Let's Chat", "Location"];

/// Which edge of the page a flow line is drawn on
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// Decorative flow lines, drawn in a 120x2000 viewBox on each side
pub static FLOW_PATHS: &[(Side, &str)] = &[
    (
        Side::Left,
        "M20 50 Q60 200 40 350 Q20 500 50 650 Q80 800 30 950 Q10 1100 60 1250 Q90 1400 40 1550 Q20 1700 70 1850",
    ),
    (
        Side::Left,
        "M10 100 Q50 250 30 400 Q10 550 40 700 Q70 850 20 1000 Q5 1150 50 1300 Q80 1450 30 1600 Q10 1750 60 1900",
    ),
    (
        Side::Left,
        "M30 150 Q70 300 50 450 Q30 600 60 750 Q90 900 40 1050 Q20 1200 70 1350 Q100 1500 50 1650 Q30 1800 80 1950",
    ),
    (
        Side::Right,
        "M100 80 Q60 230 80 380 Q100 530 70 680 Q40 830 90 980 Q110 1130 60 1280 Q30 1430 80 1580 Q100 1730 50 1880",
    ),
    (
        Side::Right,
        "M110 130 Q70 280 90 430 Q110 580 80 730 Q50 880 100 1030 Q115 1180 70 1330 Q40 1480 90 1630 Q110 1780 60 1930",
    ),
    (
        Side::Right,
        "M90 180 Q50 330 70 480 Q90 630 60 780 Q30 930 80 1080 Q100 1230 50 1380 Q20 1530 70 1680 Q90 1830 40 1980",
    ),
];

/// Total number of skill bars across every category
pub fn skill_count() -> usize {
    SKILL_CATEGORIES.iter().map(|c| c.skills.len()).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels_are_percentages() {
        for category in SKILL_CATEGORIES {
            assert!(!category.skills.is_empty(), "{}", category.title);
            for s in category.skills {
                assert!((0.0..=100.0).contains(&s.level), "{}", s.name);
            }
        }
        assert_eq!(skill_count(), 27);
    }

    #[test]
    fn test_flow_lines_split_evenly() {
        let left = FLOW_PATHS.iter().filter(|(side, _)| *side == Side::Left).count();
        assert_eq!(left, 3);
        assert_eq!(FLOW_PATHS.len(), 6);
    }
}
