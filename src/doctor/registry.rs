use super::DoctorCheck;
use super::checks::*;

pub type CheckFactory = fn() -> Box<dyn DoctorCheck>;

/// Known checks in display order.
pub struct CheckRegistry {
    checks: Vec<(&'static str, CheckFactory)>,
}

impl CheckRegistry {
    pub fn new() -> Self {
        let mut registry = CheckRegistry { checks: Vec::new() };

        registry.register::<PlatformCheck>("platform");
        registry.register::<PackageManagerCheck>("package-manager");
        registry.register::<ElevationCheck>("elevation");
        registry.register::<InternetCheck>("internet");
        registry.register::<ConfigCheck>("config");
        registry.register::<EnvironmentCheck>("environment");
        registry.register::<CatalogCheck>("catalog");

        registry
    }

    fn register<T: DoctorCheck + Default + 'static>(&mut self, id: &'static str) {
        self.checks.push((id, || Box::new(T::default())));
    }

    pub fn create_check(&self, id: &str) -> Option<Box<dyn DoctorCheck>> {
        self.checks
            .iter()
            .find(|(check_id, _)| *check_id == id)
            .map(|(_, factory)| factory())
    }

    pub fn all_checks(&self) -> Vec<Box<dyn DoctorCheck>> {
        self.checks.iter().map(|(_, factory)| factory()).collect()
    }

    pub fn ids(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.checks.iter().map(|(id, _)| *id)
    }
}

impl Default for CheckRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registered_ids_match_checks() {
        let registry = CheckRegistry::new();
        for id in registry.ids() {
            let check = registry.create_check(id).unwrap();
            assert_eq!(check.id(), id);
        }
        assert_eq!(registry.all_checks().len(), 7);
        assert!(registry.create_check("nerd-font").is_none());
    }
}
