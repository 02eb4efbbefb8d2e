use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// PID gains (persisted alongside the other setpoints)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PidGains {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
    pub integral_clamp: f64, // |integral term| limit, output units
    pub output_clamp: f64,   // |output| limit
}

impl Default for PidGains {
    fn default() -> Self {
        // Flight-level-change loop: degrees of climb angle per m/s of speed error
        Self {
            kp: 0.5,
            ki: 0.2,
            kd: 0.0,
            integral_clamp: 20.0,
            output_clamp: 30.0,
        }
    }
}

// ---------------------------------------------------------------------------
// PID Controller (single axis)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Pid {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
    pub integral_clamp: f64,
    pub output_clamp: f64,
    integral: f64,
    last_error: Option<f64>,
}

impl Pid {
    pub fn new(kp: f64, ki: f64, kd: f64) -> Self {
        Self {
            kp,
            ki,
            kd,
            integral_clamp: 1.0,
            output_clamp: f64::MAX,
            integral: 0.0,
            last_error: None,
        }
    }

    pub fn from_gains(gains: &PidGains) -> Self {
        Self::new(gains.kp, gains.ki, gains.kd).with_clamps(gains.integral_clamp, gains.output_clamp)
    }

    pub fn with_clamps(mut self, integral_clamp: f64, output_clamp: f64) -> Self {
        self.integral_clamp = integral_clamp.abs();
        self.output_clamp = output_clamp.abs();
        self
    }

    pub fn set_gains(&mut self, gains: &PidGains) {
        self.kp = gains.kp;
        self.ki = gains.ki;
        self.kd = gains.kd;
        self.integral_clamp = gains.integral_clamp.abs();
        self.output_clamp = gains.output_clamp.abs();
    }

    pub fn gains(&self) -> PidGains {
        PidGains {
            kp: self.kp,
            ki: self.ki,
            kd: self.kd,
            integral_clamp: self.integral_clamp,
            output_clamp: self.output_clamp,
        }
    }

    pub fn update(&mut self, error: f64, dt: f64) -> f64 {
        // Integral term is stored already weighted by ki and re-clamped every step
        self.integral = (self.integral + self.ki * error * dt)
            .clamp(-self.integral_clamp, self.integral_clamp);
        let derivative = match self.last_error {
            Some(prev) if dt > 0.0 => (error - prev) / dt,
            _ => 0.0,
        };
        self.last_error = Some(error);
        (self.kp * error + self.integral + self.kd * derivative)
            .clamp(-self.output_clamp, self.output_clamp)
    }

    /// Drive `input` toward `desired`.
    pub fn control(&mut self, input: f64, desired: f64, dt: f64) -> f64 {
        self.update(desired - input, dt)
    }

    /// Forget accumulated integral and derivative history.
    pub fn clear(&mut self) {
        self.integral = 0.0;
        self.last_error = None;
    }

    pub fn integral(&self) -> f64 {
        self.integral
    }
}
