// Static service catalog

use super::types::{Service, ServicePlan};

pub const SERVICE_ID: &str = "ff32ea32-cbe1-490d-a379-94b80b75d152";
pub const SYSTEM_ADMIN_PLAN_ID: &str = "5bd12fff-a293-4f3a-a6c1-670defbee447";
pub const INTERNAL_COMPONENT_PLAN_ID: &str = "900ee451-e082-4b61-9157-03c095c7e884";

pub fn services() -> Vec<Service> {
    vec![Service {
        id: SERVICE_ID.to_string(),
        name: "cdr-services".to_string(),
        description: "Cassandra service for application development and testing".to_string(),
        bindable: true,
        plan_updateable: true,
        plans: vec![
            ServicePlan {
                id: SYSTEM_ADMIN_PLAN_ID.to_string(),
                name: "system-admin".to_string(),
                description: "Manage instance or subscription pairs".to_string(),
            },
            ServicePlan {
                id: INTERNAL_COMPONENT_PLAN_ID.to_string(),
                name: "internal-component".to_string(),
                description: "Plan for communication between CDR internal components".to_string(),
            },
        ],
    }]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_shape() {
        let services = services();
        assert_eq!(services.len(), 1);

        let service = &services[0];
        assert_eq!(service.name, "cdr-services");
        assert!(service.bindable);
        assert!(service.plan_updateable);

        let plan_ids: Vec<_> = service.plans.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(plan_ids, vec![SYSTEM_ADMIN_PLAN_ID, INTERNAL_COMPONENT_PLAN_ID]);
    }
}
