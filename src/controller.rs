/// Output above this triggers an impulse.
pub const ACTION_THRESHOLD: f32 = 0.5;

/// What a controller sees each tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Observation {
    pub bird_y: f32,
    /// Left edge of the next obstacle still ahead of the birds.
    pub pipe_x: f32,
    /// Lower edge of that obstacle's upper barrier.
    pub gap_top: f32,
    /// Upper edge of that obstacle's lower barrier.
    pub gap_bottom: f32,
}

impl Observation {
    pub fn as_array(&self) -> [f32; 4] {
        [self.bird_y, self.pipe_x, self.gap_top, self.gap_bottom]
    }
}

/// Decides, once per tick, whether its bird should flap.
pub trait Controller {
    fn activate(&mut self, observation: &Observation) -> f32;

    fn wants_impulse(&mut self, observation: &Observation) -> bool {
        self.activate(observation) > ACTION_THRESHOLD
    }
}

impl<F> Controller for F
where
    F: FnMut(&Observation) -> f32,
{
    fn activate(&mut self, observation: &Observation) -> f32 {
        self(observation)
    }
}

/// Lets a population mix brains, humans and closures.
impl Controller for Box<dyn Controller + '_> {
    fn activate(&mut self, observation: &Observation) -> f32 {
        (**self).activate(observation)
    }

    fn wants_impulse(&mut self, observation: &Observation) -> bool {
        (**self).wants_impulse(observation)
    }
}

/// Keyboard-driven controller. A key press is latched until the next query.
#[derive(Debug, Clone, Copy, Default)]
pub struct HumanController {
    pending: bool,
}

impl HumanController {
    pub fn press(&mut self) {
        self.pending = true;
    }
}

impl Controller for HumanController {
    fn activate(&mut self, _observation: &Observation) -> f32 {
        if std::mem::take(&mut self.pending) { 1.0 } else { 0.0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_is_exclusive() {
        let obs = Observation::default();
        let mut half = |_: &Observation| 0.5_f32;
        let mut above = |_: &Observation| 0.51_f32;
        assert!(!half.wants_impulse(&obs));
        assert!(above.wants_impulse(&obs));
    }

    #[test]
    fn human_press_fires_once() {
        let obs = Observation::default();
        let mut human = HumanController::default();
        assert!(!human.wants_impulse(&obs));
        human.press();
        human.press();
        assert!(human.wants_impulse(&obs));
        assert!(!human.wants_impulse(&obs));
    }

    #[test]
    fn boxed_controllers_delegate() {
        let mut boxed: Box<dyn Controller> = Box::new(|o: &Observation| o.bird_y);
        let obs = Observation {
            bird_y: 0.9,
            ..Observation::default()
        };
        assert!(boxed.wants_impulse(&obs));
    }
}
