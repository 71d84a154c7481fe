// hf-core/src/units.rs

use uom::si::f64::{
    Frequency as UomFrequency, MassDensity as UomMassDensity,
    MassRate as UomMassRate, Ratio as UomRatio,
    ThermodynamicTemperature as UomThermodynamicTemperature, Time as UomTime,
    Volume as UomVolume,
};

// Public canonical unit types (SI, f64)
pub type Frequency = UomFrequency;
pub type Density = UomMassDensity;
pub type MassRate = UomMassRate;
pub type Ratio = UomRatio;
pub type Temperature = UomThermodynamicTemperature;
pub type Time = UomTime;
pub type Volume = UomVolume;

#[inline]
pub fn minutes(v: f64) -> Time {
    use uom::si::time::minute;
    Time::new::<minute>(v)
}

#[inline]
pub fn m3(v: f64) -> Volume {
    use uom::si::volume::cubic_meter;
    Volume::new::<cubic_meter>(v)
}

#[inline]
pub fn degc(v: f64) -> Temperature {
    use uom::si::thermodynamic_temperature::degree_celsius;
    Temperature::new::<degree_celsius>(v)
}

#[inline]
pub fn percent(v: f64) -> Ratio {
    use uom::si::ratio::percent;
    Ratio::new::<percent>(v)
}

/// Mass flow given in grams per minute (humidifier output rating).
#[inline]
pub fn g_per_min(v: f64) -> MassRate {
    use uom::si::mass_rate::kilogram_per_second;
    MassRate::new::<kilogram_per_second>(v / 1000.0 / 60.0)
}

/// Air changes per hour (ACH) as a frequency.
#[inline]
pub fn per_hour(v: f64) -> Frequency {
    use uom::si::frequency::hertz;
    Frequency::new::<hertz>(v / 3600.0)
}

/// Vapour density given in grams per cubic metre.
#[inline]
pub fn g_per_m3(v: f64) -> Density {
    use uom::si::mass_density::kilogram_per_cubic_meter;
    Density::new::<kilogram_per_cubic_meter>(v / 1000.0)
}

/// Readers back into the chamber model's working units (g, min, m^3, degC).
pub mod working {
    use super::*;

    #[inline]
    pub fn minutes_of(t: Time) -> f64 {
        use uom::si::time::minute;
        t.get::<minute>()
    }

    #[inline]
    pub fn m3_of(v: Volume) -> f64 {
        use uom::si::volume::cubic_meter;
        v.get::<cubic_meter>()
    }

    #[inline]
    pub fn degc_of(t: Temperature) -> f64 {
        use uom::si::thermodynamic_temperature::degree_celsius;
        t.get::<degree_celsius>()
    }

    #[inline]
    pub fn percent_of(r: Ratio) -> f64 {
        use uom::si::ratio::percent;
        r.get::<percent>()
    }

    #[inline]
    pub fn g_per_min_of(m: MassRate) -> f64 {
        use uom::si::mass_rate::kilogram_per_second;
        m.get::<kilogram_per_second>() * 1000.0 * 60.0
    }

    #[inline]
    pub fn per_hour_of(f: Frequency) -> f64 {
        use uom::si::frequency::hertz;
        f.get::<hertz>() * 3600.0
    }

    #[inline]
    pub fn g_per_m3_of(d: Density) -> f64 {
        use uom::si::mass_density::kilogram_per_cubic_meter;
        d.get::<kilogram_per_cubic_meter>() * 1000.0
    }
}

#[cfg(test)]
mod tests {
    use super::working::*;
    use super::*;

    #[test]
    fn working_units_round_trip() {
        assert!((g_per_min_of(g_per_min(3.3)) - 3.3).abs() < 1e-12);
        assert!((per_hour_of(per_hour(10.0)) - 10.0).abs() < 1e-12);
        assert!((degc_of(degc(20.0)) - 20.0).abs() < 1e-9);
        assert!((minutes_of(minutes(60.0)) - 60.0).abs() < 1e-12);
        assert!((g_per_m3_of(g_per_m3(17.3)) - 17.3).abs() < 1e-12);
        assert!((percent_of(percent(40.0)) - 40.0).abs() < 1e-12);
        assert!((m3_of(m3(0.2)) - 0.2).abs() < 1e-15);
    }
}
