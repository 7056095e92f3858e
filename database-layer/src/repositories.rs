// One repository per entity, behind trait objects
use std::sync::Arc;

use sqlx::PgPool;

use crate::entity::Entity;
use crate::memory::InMemoryRepository;
use crate::models::{
    Doctor, InsuranceCalculation, InsurancePlan, InsuranceProvider, InsuranceTariff,
    MedicalService, Patient, PatientInsurance, Payment, PlanService, Reception, ReceptionService,
    ServiceCategory,
};
use crate::postgres::PgRepository;
use crate::repository::Repository;

pub type Repo<T> = Arc<dyn Repository<T>>;

/// Repository bundle handed to the services
#[derive(Clone)]
pub struct Repositories {
    pub patients: Repo<Patient>,
    pub doctors: Repo<Doctor>,
    pub service_categories: Repo<ServiceCategory>,
    pub medical_services: Repo<MedicalService>,
    pub insurance_providers: Repo<InsuranceProvider>,
    pub insurance_plans: Repo<InsurancePlan>,
    pub plan_services: Repo<PlanService>,
    pub insurance_tariffs: Repo<InsuranceTariff>,
    pub patient_insurances: Repo<PatientInsurance>,
    pub receptions: Repo<Reception>,
    pub reception_services: Repo<ReceptionService>,
    pub insurance_calculations: Repo<InsuranceCalculation>,
    pub payments: Repo<Payment>,
}

impl Repositories {
    pub fn postgres(pool: PgPool) -> Self {
        fn repo<T: Entity>(pool: &PgPool) -> Repo<T> {
            Arc::new(PgRepository::<T>::new(pool.clone()))
        }

        Self {
            patients: repo(&pool),
            doctors: repo(&pool),
            service_categories: repo(&pool),
            medical_services: repo(&pool),
            insurance_providers: repo(&pool),
            insurance_plans: repo(&pool),
            plan_services: repo(&pool),
            insurance_tariffs: repo(&pool),
            patient_insurances: repo(&pool),
            receptions: repo(&pool),
            reception_services: repo(&pool),
            insurance_calculations: repo(&pool),
            payments: repo(&pool),
        }
    }

    pub fn in_memory() -> Self {
        fn repo<T: Entity>() -> Repo<T> {
            Arc::new(InMemoryRepository::<T>::new())
        }

        Self {
            patients: repo(),
            doctors: repo(),
            service_categories: repo(),
            medical_services: repo(),
            insurance_providers: repo(),
            insurance_plans: repo(),
            plan_services: repo(),
            insurance_tariffs: repo(),
            patient_insurances: repo(),
            receptions: repo(),
            reception_services: repo(),
            insurance_calculations: repo(),
            payments: repo(),
        }
    }
}
