//! Station equations
//!
//! Nominal stations are the numbers printed on plans. They may jump where a
//! route is renumbered; each jump is a [`StationEquation`] mapping a "back"
//! station to an "ahead" station at the same physical point. Internal stations
//! are continuous offsets from the first entry of the table, the anchor.

/// Whether nominal stations grow or shrink in the direction of travel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StationDirection {
    #[default]
    Ascending,
    Descending,
}

impl StationDirection {
    #[inline]
    pub fn sign(self) -> f64 {
        match self {
            StationDirection::Ascending => 1.0,
            StationDirection::Descending => -1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StationEquation {
    /// Station of the zone that ends here
    pub back: f64,
    /// Station of the zone that begins here
    pub ahead: f64,
    /// Numbering direction of the zone that begins here
    pub direction: StationDirection,
}

impl StationEquation {
    pub fn new(back: f64, ahead: f64, direction: StationDirection) -> Self {
        Self {
            back,
            ahead,
            direction,
        }
    }
}

/// Ordered table of station equations. The first entry anchors internal
/// offset 0 at its `ahead` station.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StationEquations {
    entries: Vec<StationEquation>,
}

impl StationEquations {
    /// Table with only an ascending anchor at `start_station`.
    pub fn new(start_station: f64) -> Self {
        Self {
            entries: vec![StationEquation::new(
                start_station,
                start_station,
                StationDirection::Ascending,
            )],
        }
    }

    pub fn from_entries(entries: Vec<StationEquation>) -> Self {
        Self { entries }
    }

    pub fn push(&mut self, equation: StationEquation) {
        self.entries.push(equation);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[StationEquation] {
        &self.entries
    }

    pub fn anchor(&self) -> Option<&StationEquation> {
        self.entries.first()
    }

    fn zones(&self) -> (f64, f64, &[StationEquation]) {
        match self.entries.split_first() {
            Some((anchor, rest)) => (anchor.ahead, anchor.direction.sign(), rest),
            None => (0.0, 1.0, &[]),
        }
    }

    /// Continuous offset of a nominal station from the anchor.
    ///
    /// Each equation whose back station the query lies beyond contributes the
    /// full length of the zone it closes; the query is then measured from the
    /// ahead station of the last zone entered.
    pub fn internal_station(&self, station: f64) -> f64 {
        let (mut origin, mut sign, rest) = self.zones();
        let mut offset = 0.0;
        for equation in rest {
            if (station - equation.back) * sign <= 0.0 {
                break;
            }
            offset += (equation.back - origin) * sign;
            origin = equation.ahead;
            sign = equation.direction.sign();
        }
        offset + (station - origin) * sign
    }

    /// Nominal station of a continuous offset from the anchor.
    pub fn nominal_station(&self, internal: f64) -> f64 {
        let (mut origin, mut sign, rest) = self.zones();
        let mut offset = 0.0;
        for equation in rest {
            let zone = (equation.back - origin) * sign;
            if internal <= offset + zone {
                break;
            }
            offset += zone;
            origin = equation.ahead;
            sign = equation.direction.sign();
        }
        origin + (internal - offset) * sign
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn renumbered() -> StationEquations {
        let mut table = StationEquations::new(100.0);
        table.push(StationEquation::new(200.0, 500.0, StationDirection::Ascending));
        table
    }

    #[test]
    fn first_entry_is_the_anchor() {
        let table = renumbered();
        assert_eq!(table.entries().len(), 2);
        assert_eq!(
            table.anchor(),
            Some(&StationEquation::new(100.0, 100.0, StationDirection::Ascending))
        );
        assert_eq!(table.internal_station(100.0), 0.0);

        let empty = StationEquations::default();
        assert!(empty.anchor().is_none());
        assert_eq!(empty.internal_station(42.0), 42.0);
    }

    #[test]
    fn walks_the_table_instead_of_subtracting_the_anchor() {
        let table = renumbered();
        assert_eq!(table.internal_station(250.0), (200.0 - 100.0) + (250.0 - 500.0));
        assert_eq!(table.internal_station(150.0), 50.0);
        assert_eq!(table.internal_station(200.0), 100.0);
        assert_eq!(table.internal_station(550.0), 150.0);
    }

    #[test]
    fn nominal_inverts_internal_inside_each_zone() {
        let table = renumbered();
        for station in [100.0, 150.0, 200.0, 500.5, 620.0] {
            let internal = table.internal_station(station);
            assert!((table.nominal_station(internal) - station).abs() < 1e-9);
        }
    }

    #[test]
    fn descending_zone() {
        let table = StationEquations::from_entries(vec![
            StationEquation::new(0.0, 0.0, StationDirection::Ascending),
            StationEquation::new(100.0, 900.0, StationDirection::Descending),
        ]);
        assert_eq!(table.internal_station(850.0), 150.0);
        assert_eq!(table.nominal_station(150.0), 850.0);
    }

    #[test]
    fn empty_table_is_identity() {
        let table = StationEquations::default();
        assert!(table.is_empty());
        assert_eq!(table.internal_station(42.0), 42.0);
        assert_eq!(table.nominal_station(42.0), 42.0);
    }
}
