extern crate rppal;
extern crate std;

use crate::result;

const EMPTY_VOLTS: f32 = 3.0;
const FULL_VOLTS: f32 = 4.2;

// Soft PWM; fast enough that the pulse doesn't flicker.
const LED_PWM_HZ: f64 = 200.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const OFF: Rgb = Rgb{r: 0, g: 0, b: 0};
}

/// Charge level plus the pulse it is shown with. Refreshed from a voltage
/// reading on wake-up events, then sampled every frame by `led_color`.
#[derive(Debug, Clone, PartialEq)]
pub struct BatteryIndicator {
    pub percentage: f32,
    pub pulse_hz: f32,
    pub color: Rgb,
}

impl BatteryIndicator {
    pub fn from_voltage(volts: f32) -> BatteryIndicator {
        let percentage = ((volts - EMPTY_VOLTS) / (FULL_VOLTS - EMPTY_VOLTS) * 100.0)
            .max(0.0)
            .min(100.0);

        return BatteryIndicator{
            percentage: percentage,
            pulse_hz: pulse_hz(percentage),
            color: charge_color(percentage),
        };
    }

    /// Pulsing colour at `elapsed` since boot, or off when nobody is near.
    pub fn led_color(&self, detected: bool, elapsed: std::time::Duration) -> Rgb {
        if !detected {
            return Rgb::OFF;
        }

        let t = elapsed.as_secs_f32();
        let brightness = ((2.0 * std::f32::consts::PI * self.pulse_hz * t).sin() + 1.0) / 2.0;
        return Rgb{
            r: (self.color.r as f32 * brightness) as u8,
            g: (self.color.g as f32 * brightness) as u8,
            b: 0,
        };
    }
}

// Lower charge blinks faster.
fn pulse_hz(percentage: f32) -> f32 {
    if percentage <= 15.0 {
        return 4.0;
    } else if percentage <= 30.0 {
        return 2.0;
    } else if percentage <= 45.0 {
        return 1.0;
    }
    return 0.25;
}

fn charge_color(percentage: f32) -> Rgb {
    if percentage >= 50.0 {
        let ratio = (percentage - 50.0) / 50.0;
        return Rgb{
            r: (120.0 * (1.0 - ratio)) as u8,
            g: 100 + (20.0 * ratio) as u8,
            b: 0,
        };
    } else if percentage >= 30.0 {
        let ratio = (percentage - 30.0) / 20.0;
        return Rgb{r: 120, g: (100.0 * ratio) as u8, b: 0};
    }
    return Rgb{r: 120, g: 0, b: 0};
}

/// Where LED colours end up.
pub trait LedSink {
    fn show(&mut self, color: Rgb) -> result::SeoulDashResult<()>;
}

/// Common-cathode RGB LED on three GPIO pins, dimmed with software PWM.
/// Channel values are on the 0..=255 scale.
pub struct GpioLed {
    pins: [rppal::gpio::OutputPin; 3],
}

impl GpioLed {
    pub fn new(pins: [u8; 3]) -> result::SeoulDashResult<GpioLed> {
        let gpio = rppal::gpio::Gpio::new()?;
        return Ok(GpioLed{
            pins: [
                gpio.get(pins[0])?.into_output(),
                gpio.get(pins[1])?.into_output(),
                gpio.get(pins[2])?.into_output(),
            ],
        });
    }
}

impl LedSink for GpioLed {
    fn show(&mut self, color: Rgb) -> result::SeoulDashResult<()> {
        for (pin, level) in self.pins.iter_mut().zip([color.r, color.g, color.b].iter()) {
            pin.set_pwm_frequency(LED_PWM_HZ, *level as f64 / 255.0)?;
        }
        return Ok(());
    }
}

/// Drives a sink from the latest charge reading. Only colour changes are
/// written out.
pub struct BatteryLed<S: LedSink> {
    indicator: Option<BatteryIndicator>,
    sink: S,
    shown: Option<Rgb>,
}

impl<S: LedSink> BatteryLed<S> {
    pub fn new(sink: S) -> BatteryLed<S> {
        return BatteryLed{
            indicator: None,
            sink: sink,
            shown: None,
        };
    }

    pub fn set_indicator(&mut self, indicator: BatteryIndicator) {
        self.indicator = Some(indicator);
    }

    /// Stays dark until the first voltage reading.
    pub fn tick(&mut self, detected: bool, elapsed: std::time::Duration) -> result::SeoulDashResult<Rgb> {
        let color = match self.indicator {
            Some(ref indicator) => indicator.led_color(detected, elapsed),
            None => Rgb::OFF,
        };
        if self.shown != Some(color) {
            self.sink.show(color)?;
            self.shown = Some(color);
        }
        return Ok(color);
    }

    #[cfg(test)]
    pub fn sink(&self) -> &S {
        return &self.sink;
    }
}

/// Linux power-supply class files report microvolts.
pub fn read_voltage(path: &str) -> result::SeoulDashResult<f32> {
    let raw = std::fs::read_to_string(path)?;
    let microvolts: f32 = raw.trim().parse()
        .map_err(|_| result::make_error(&format!("Unparseable voltage '{}' in {}", raw.trim(), path)))?;
    return Ok(microvolts / 1_000_000.0);
}

#[cfg(test)]
mod tests {
    use super::{read_voltage, BatteryIndicator, BatteryLed, LedSink, Rgb};
    use crate::result;

    impl LedSink for Vec<Rgb> {
        fn show(&mut self, color: Rgb) -> result::SeoulDashResult<()> {
            self.push(color);
            return Ok(());
        }
    }

    #[test]
    fn percentage_is_clamped() {
        assert_eq!(0.0, BatteryIndicator::from_voltage(2.5).percentage);
        assert_eq!(100.0, BatteryIndicator::from_voltage(4.5).percentage);
        assert!((BatteryIndicator::from_voltage(3.6).percentage - 50.0).abs() < 0.01);
    }

    #[test]
    fn staged_pulse() {
        assert_eq!(4.0, BatteryIndicator::from_voltage(3.1).pulse_hz);
        assert_eq!(2.0, BatteryIndicator::from_voltage(3.3).pulse_hz);
        assert_eq!(1.0, BatteryIndicator::from_voltage(3.5).pulse_hz);
        assert_eq!(0.25, BatteryIndicator::from_voltage(4.0).pulse_hz);
    }

    #[test]
    fn color_gradient() {
        assert_eq!(Rgb{r: 0, g: 120, b: 0}, BatteryIndicator::from_voltage(4.2).color);
        assert_eq!(Rgb{r: 120, g: 0, b: 0}, BatteryIndicator::from_voltage(3.0).color);
        // 40%: halfway through the amber band.
        let amber = BatteryIndicator::from_voltage(3.48).color;
        assert_eq!(120, amber.r);
        assert!(amber.g >= 49 && amber.g <= 50, "g = {}", amber.g);
    }

    #[test]
    fn led_is_off_without_detection() {
        let battery = BatteryIndicator::from_voltage(4.2);
        assert_eq!(Rgb::OFF, battery.led_color(false, std::time::Duration::from_millis(250)));
    }

    #[test]
    fn led_pulses() {
        // 0.25 Hz: peak at 1s, trough at 3s.
        let battery = BatteryIndicator::from_voltage(4.2);
        assert_eq!(Rgb{r: 0, g: 120, b: 0}, battery.led_color(true, std::time::Duration::from_secs(1)));
        assert_eq!(Rgb::OFF, battery.led_color(true, std::time::Duration::from_secs(3)));
    }

    #[test]
    fn reads_microvolts() {
        let volts = read_voltage("testdata/voltage_now").expect("read_voltage");
        assert!((volts - 3.912).abs() < 0.001);
    }

    #[test]
    fn led_dark_before_first_reading() {
        let mut led = BatteryLed::new(vec![]);
        assert_eq!(Rgb::OFF, led.tick(true, std::time::Duration::from_secs(1)).expect("tick"));
        assert_eq!(&vec![Rgb::OFF], led.sink());
    }

    #[test]
    fn led_writes_only_changes() {
        let mut led = BatteryLed::new(vec![]);
        led.set_indicator(BatteryIndicator::from_voltage(4.2));

        let peak = std::time::Duration::from_secs(1);
        led.tick(true, peak).expect("tick");
        led.tick(true, peak).expect("tick");
        led.tick(false, peak).expect("tick");
        assert_eq!(&vec![Rgb{r: 0, g: 120, b: 0}, Rgb::OFF], led.sink());
    }
}
