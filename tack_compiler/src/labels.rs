//! Branch label allocation.
use smol_str::SmolStr;

/// Allocates branch labels unique within the output unit.
///
/// Labels are `{className}_{n}` with the counter restarting at zero
/// for every class, so compiling the same class twice yields identical
/// output.
#[derive(Debug, Default)]
pub struct LabelMaker {
    class_name: SmolStr,
    counter: u32,
}

impl LabelMaker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter_class(&mut self, name: impl Into<SmolStr>) {
        self.class_name = name.into();
        self.counter = 0;
    }

    pub fn fresh(&mut self) -> SmolStr {
        let label = SmolStr::new(format!("{}_{}", self.class_name, self.counter));
        self.counter += 1;
        label
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_sequential_labels() {
        let mut labels = LabelMaker::new();
        labels.enter_class("Main");
        assert_eq!(labels.fresh().as_str(), "Main_0");
        assert_eq!(labels.fresh().as_str(), "Main_1");
        assert_eq!(labels.fresh().as_str(), "Main_2");
    }

    #[test]
    fn test_counter_resets_per_class() {
        let mut labels = LabelMaker::new();
        labels.enter_class("Main");
        labels.fresh();
        labels.fresh();

        labels.enter_class("Game");
        assert_eq!(labels.fresh().as_str(), "Game_0");
    }
}
