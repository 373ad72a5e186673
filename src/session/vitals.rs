/// One bounded session resource: water quality, compute cycles, morale.
///
/// `value` stays inside `[min, max]`; every mutation routes through
/// [`Vital::apply_delta`], which clamps. `target` is the per-vital victory
/// threshold, `critical_floor` the collapse threshold, both optional.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vital {
    pub id: String,
    pub value: i64,
    pub min: i64,
    pub max: i64,
    pub target: Option<i64>,
    pub critical_floor: Option<i64>,
}

impl Vital {
    /// Apply a delta and clamp into `[min, max]`. Returns the post-clamp value.
    pub fn apply_delta(&mut self, delta: i64) -> i64 {
        self.value = (self.value + delta).clamp(self.min, self.max);
        self.value
    }

    /// Vitals without a target never block victory.
    pub fn meets_target(&self) -> bool {
        self.target.map(|t| self.value >= t).unwrap_or(true)
    }

    /// At or below the declared critical floor.
    pub fn collapsed(&self) -> bool {
        self.critical_floor
            .map(|floor| self.value <= floor)
            .unwrap_or(false)
    }

    /// Drained to the lower bound.
    pub fn exhausted(&self) -> bool {
        self.value <= self.min
    }

    /// Spendable amount above the lower bound.
    pub fn headroom(&self) -> i64 {
        self.value - self.min
    }
}

/// The vitals of one session, in quest declaration order. Order is stable and
/// drives tie-breaks in the outcome classifier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VitalBank {
    vitals: Vec<Vital>,
}

impl VitalBank {
    pub fn new(vitals: Vec<Vital>) -> Self {
        Self { vitals }
    }

    pub fn get(&self, id: &str) -> Option<&Vital> {
        self.vitals.iter().find(|vital| vital.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Vital> {
        self.vitals.iter_mut().find(|vital| vital.id == id)
    }

    pub fn value(&self, id: &str) -> Option<i64> {
        self.get(id).map(|vital| vital.value)
    }

    /// Clamped delta against one vital. `None` when no vital carries the id.
    pub fn apply_delta(&mut self, id: &str, delta: i64) -> Option<i64> {
        self.get_mut(id).map(|vital| vital.apply_delta(delta))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Vital> {
        self.vitals.iter()
    }

    pub fn all_targets_met(&self) -> bool {
        self.vitals.iter().all(Vital::meets_target)
    }

    /// Any vital declares a victory target.
    pub fn has_target(&self) -> bool {
        self.vitals.iter().any(|vital| vital.target.is_some())
    }

    /// First vital at or below its critical floor, in declaration order.
    pub fn first_collapsed(&self) -> Option<&Vital> {
        self.vitals.iter().find(|vital| vital.collapsed())
    }
}
