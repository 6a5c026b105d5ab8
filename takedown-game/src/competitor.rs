//! Competitor value types shared by the outcome model, bracket and exchange engines.
use serde::{Deserialize, Serialize};

pub const SKILL_MAX: f64 = 100.0;
pub const ENERGY_MAX: f64 = 100.0;
pub const COMPOSURE_MAX: f64 = 100.0;

const TECHNIQUE_WEIGHT: f64 = 0.22;
const MAT_IQ_WEIGHT: f64 = 0.18;
const STRENGTH_WEIGHT: f64 = 0.17;
const CONDITIONING_WEIGHT: f64 = 0.15;
const SPEED_WEIGHT: f64 = 0.15;
const FLEXIBILITY_WEIGHT: f64 = 0.13;

/// The six trainable attributes, each on a 0–100 scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Skills {
    pub technique: f64,
    pub mat_iq: f64,
    pub conditioning: f64,
    pub strength: f64,
    pub speed: f64,
    pub flexibility: f64,
}

impl Skills {
    /// Every attribute set to the same value.
    #[must_use]
    pub fn uniform(value: f64) -> Self {
        let value = clamp_skill(value);
        Self {
            technique: value,
            mat_iq: value,
            conditioning: value,
            strength: value,
            speed: value,
            flexibility: value,
        }
    }

    /// Copy with every attribute clamped into `[0, 100]`.
    #[must_use]
    pub fn clamped(self) -> Self {
        Self {
            technique: clamp_skill(self.technique),
            mat_iq: clamp_skill(self.mat_iq),
            conditioning: clamp_skill(self.conditioning),
            strength: clamp_skill(self.strength),
            speed: clamp_skill(self.speed),
            flexibility: clamp_skill(self.flexibility),
        }
    }

    /// Weighted mean of the six attributes.
    #[must_use]
    pub fn overall(&self) -> f64 {
        self.flexibility.mul_add(
            FLEXIBILITY_WEIGHT,
            self.speed.mul_add(
                SPEED_WEIGHT,
                self.conditioning.mul_add(
                    CONDITIONING_WEIGHT,
                    self.strength.mul_add(
                        STRENGTH_WEIGHT,
                        self.technique
                            .mul_add(TECHNIQUE_WEIGHT, self.mat_iq * MAT_IQ_WEIGHT),
                    ),
                ),
            ),
        )
    }
}

impl Default for Skills {
    fn default() -> Self {
        Self::uniform(50.0)
    }
}

/// Live competitor state consumed by the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Competitor {
    pub skills: Skills,
    /// 0–100; lower means more fatigued.
    pub energy: f64,
    /// 0–1; never heals during a match.
    pub injury: f64,
    /// 0–100; the inverse of stress.
    pub composure: f64,
}

impl Competitor {
    #[must_use]
    pub fn new(skills: Skills) -> Self {
        Self {
            skills: skills.clamped(),
            energy: ENERGY_MAX,
            injury: 0.0,
            composure: 80.0,
        }
    }

    /// Fresh, healthy competitor with every skill at `rating`.
    #[must_use]
    pub fn with_rating(rating: f64) -> Self {
        Self::new(Skills::uniform(rating))
    }

    #[must_use]
    pub fn with_energy(mut self, energy: f64) -> Self {
        self.energy = energy.clamp(0.0, ENERGY_MAX);
        self
    }

    #[must_use]
    pub fn with_injury(mut self, injury: f64) -> Self {
        self.injury = injury.clamp(0.0, 1.0);
        self
    }

    #[must_use]
    pub fn with_composure(mut self, composure: f64) -> Self {
        self.composure = composure.clamp(0.0, COMPOSURE_MAX);
        self
    }

    #[must_use]
    pub fn overall_rating(&self) -> f64 {
        self.skills.overall()
    }

    #[must_use]
    pub fn stress(&self) -> f64 {
        COMPOSURE_MAX - self.composure
    }
}

impl Default for Competitor {
    fn default() -> Self {
        Self::new(Skills::default())
    }
}

/// A named competitor entered in a contest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entrant {
    pub name: String,
    pub competitor: Competitor,
}

impl Entrant {
    #[must_use]
    pub fn new(name: impl Into<String>, competitor: Competitor) -> Self {
        Self {
            name: name.into(),
            competitor,
        }
    }

    #[must_use]
    pub fn rating(&self) -> f64 {
        self.competitor.overall_rating()
    }
}

/// External modifiers applied to the requesting competitor for one match.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchModifiers {
    /// Multiplier on the requesting competitor's rating, clamped to `[0.5, 1.5]`.
    #[serde(default = "MatchModifiers::default_performance")]
    pub performance: f64,
    #[serde(default)]
    pub rivalry: bool,
}

impl MatchModifiers {
    #[must_use]
    pub const fn default_performance() -> f64 {
        1.0
    }

    #[must_use]
    pub const fn rivalry() -> Self {
        Self {
            performance: 1.0,
            rivalry: true,
        }
    }

    #[must_use]
    pub fn effective_performance(&self) -> f64 {
        if self.performance.is_finite() {
            self.performance.clamp(0.5, 1.5)
        } else {
            1.0
        }
    }
}

impl Default for MatchModifiers {
    fn default() -> Self {
        Self {
            performance: Self::default_performance(),
            rivalry: false,
        }
    }
}

fn clamp_skill(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, SKILL_MAX)
    } else {
        0.0
    }
}
