use crate::domain::models::AppError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotionPhase {
    Idle,
    Running,
    Completed,
}

#[derive(Debug, Clone)]
pub struct MotionMachine {
    state: MotionPhase,
}

impl MotionMachine {
    pub fn new() -> Self {
        Self {
            state: MotionPhase::Idle,
        }
    }

    pub fn state(&self) -> MotionPhase {
        self.state
    }

    pub fn start(&mut self) -> Result<(), AppError> {
        if self.state != MotionPhase::Idle {
            return Err(AppError::new(
                "INVALID_MOTION_STATE",
                "only idle motion can start",
                Some("cancel the current run before starting again".to_string()),
            ));
        }
        self.state = MotionPhase::Running;
        Ok(())
    }

    /// Idle is accepted as well so a zero-step run can finish without ever ticking.
    pub fn complete(&mut self) -> Result<(), AppError> {
        if self.state == MotionPhase::Completed {
            return Err(AppError::new(
                "INVALID_MOTION_STATE",
                "motion already completed",
                None,
            ));
        }
        self.state = MotionPhase::Completed;
        Ok(())
    }

    pub fn cancel(&mut self) -> Result<(), AppError> {
        if self.state == MotionPhase::Completed {
            return Err(AppError::new(
                "INVALID_MOTION_STATE",
                "completed motion cannot be cancelled",
                None,
            ));
        }
        self.state = MotionPhase::Idle;
        Ok(())
    }
}

impl Default for MotionMachine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::{MotionMachine, MotionPhase};

    #[test]
    fn motion_machine_full_flow() {
        let mut machine = MotionMachine::new();
        machine.start().unwrap();
        assert_eq!(machine.state(), MotionPhase::Running);
        machine.complete().unwrap();
        assert_eq!(machine.state(), MotionPhase::Completed);
    }

    #[test]
    fn motion_machine_rejects_double_start() {
        let mut machine = MotionMachine::new();
        machine.start().unwrap();
        let result = machine.start();
        assert_eq!(result.unwrap_err().code, "INVALID_MOTION_STATE");
        assert_eq!(machine.state(), MotionPhase::Running);
    }

    #[test]
    fn cancel_returns_running_motion_to_idle() {
        let mut machine = MotionMachine::new();
        machine.start().unwrap();
        machine.cancel().unwrap();
        assert_eq!(machine.state(), MotionPhase::Idle);
    }

    #[test]
    fn zero_step_motion_completes_from_idle() {
        let mut machine = MotionMachine::new();
        machine.complete().unwrap();
        assert_eq!(machine.state(), MotionPhase::Completed);
        assert!(machine.cancel().is_err());
    }
}
