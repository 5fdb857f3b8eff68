use std::time::Duration;

const MAX_STEP: f64 = 1.0 / 240.0;
const REST_DELTA: f64 = 0.01;
const REST_SPEED: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spring {
    pub stiffness: f64,
    pub damping: f64,
    pub mass: f64,
}

impl Spring {
    pub fn new(stiffness: f64, damping: f64) -> Self {
        if !is_physical(stiffness) || !is_physical(damping) {
            return Self::default();
        }
        Self {
            stiffness,
            damping,
            mass: 1.0,
        }
    }

    // 1.0 is critical damping; below that the motion overshoots.
    pub fn damping_ratio(&self) -> f64 {
        self.damping / (2.0 * (self.stiffness * self.mass).sqrt())
    }
}

impl Default for Spring {
    fn default() -> Self {
        Self {
            stiffness: 200.0,
            damping: 30.0,
            mass: 1.0,
        }
    }
}

pub fn is_physical(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

#[derive(Debug, Clone)]
pub struct SpringAnimation {
    spring: Spring,
    position: f64,
    velocity: f64,
    target: f64,
}

impl SpringAnimation {
    pub fn new(spring: Spring, from: f64, to: f64) -> Self {
        Self {
            spring,
            position: from,
            velocity: 0.0,
            target: to,
        }
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    pub fn is_settled(&self) -> bool {
        (self.position - self.target).abs() < REST_DELTA && self.velocity.abs() < REST_SPEED
    }

    pub fn step(&mut self, dt: Duration) {
        let mut remaining = dt.as_secs_f64();
        while remaining > 0.0 && !self.is_settled() {
            let h = remaining.min(MAX_STEP);
            let displacement = self.position - self.target;
            let force = -self.spring.stiffness * displacement - self.spring.damping * self.velocity;
            self.velocity += force / self.spring.mass * h;
            self.position += self.velocity * h;
            remaining -= h;
        }
        if self.is_settled() {
            self.position = self.target;
            self.velocity = 0.0;
        }
    }
}

/// Owner of the page scroll offset. At most one animation drives it at a time.
#[derive(Debug, Clone)]
pub struct ScrollController {
    spring: Spring,
    offset: f64,
    max_offset: f64,
    animation: Option<SpringAnimation>,
}

impl ScrollController {
    pub fn new(spring: Spring) -> Self {
        Self {
            spring,
            offset: 0.0,
            max_offset: f64::MAX,
            animation: None,
        }
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn row(&self) -> u16 {
        self.offset.round().clamp(0.0, u16::MAX as f64) as u16
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    pub fn target(&self) -> Option<f64> {
        self.animation.as_ref().map(SpringAnimation::target)
    }

    pub fn set_max_offset(&mut self, max: f64) {
        self.max_offset = max.max(0.0);
        if self.offset > self.max_offset {
            self.offset = self.max_offset;
        }
        if let Some(animation) = self.animation.as_mut() {
            if animation.target > self.max_offset {
                animation.target = self.max_offset;
            }
        }
    }

    fn clamp(&self, value: f64) -> f64 {
        value.clamp(0.0, self.max_offset)
    }

    pub fn start(&mut self, target: f64) {
        self.stop();
        let target = self.clamp(target);
        if (target - self.offset).abs() < REST_DELTA {
            self.offset = target;
            return;
        }
        self.animation = Some(SpringAnimation::new(self.spring, self.offset, target));
    }

    pub fn stop(&mut self) -> bool {
        self.animation.take().is_some()
    }

    pub fn jump_to(&mut self, offset: f64) {
        self.stop();
        self.offset = self.clamp(offset);
    }

    pub fn scroll_by(&mut self, delta: f64) {
        let next = self.offset + delta;
        self.jump_to(next);
    }

    pub fn tick(&mut self, dt: Duration) -> bool {
        let Some(animation) = self.animation.as_mut() else {
            return false;
        };
        let before = self.offset;
        animation.step(dt);
        let position = animation.position();
        let settled = animation.is_settled();
        self.offset = position.clamp(0.0, self.max_offset);
        if settled {
            self.animation = None;
        }
        (self.offset - before).abs() > f64::EPSILON
    }
}

impl Default for ScrollController {
    fn default() -> Self {
        Self::new(Spring::default())
    }
}
