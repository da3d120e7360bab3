use serde::{Deserialize, Deserializer};

use crate::error::Error;

/// A patient health record as supplied by the data-access layer.
///
/// Every field is optional. List fields treat `null`, absence and `[]` alike;
/// the renderer turns all three into a "no data" notice.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HealthRecord {
    /// Store key. Preferred over `id` when a record carries both.
    #[serde(rename = "_id", deserialize_with = "record_id")]
    pub object_id: Option<String>,
    #[serde(deserialize_with = "record_id")]
    pub id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub gender: Option<String>,
    pub age: Option<f64>,
    pub date_of_birth: Option<String>,
    pub blood_group: Option<String>,
    pub contact_details: Option<ContactDetails>,
    pub government_id: Option<String>,
    pub address: Option<Address>,

    pub subscription_plan: Option<String>,
    pub subscription_amount: Option<f64>,
    #[serde(deserialize_with = "nullable_list")]
    pub subscription_benefits: Vec<String>,

    #[serde(deserialize_with = "nullable_list")]
    pub chronic_conditions: Vec<ChronicCondition>,
    #[serde(deserialize_with = "nullable_list")]
    pub past_medical_conditions: Vec<PastCondition>,
    #[serde(deserialize_with = "nullable_list")]
    pub allergies: Vec<Allergy>,
    #[serde(deserialize_with = "nullable_list")]
    pub current_medications: Vec<CurrentMedication>,
    #[serde(deserialize_with = "nullable_list")]
    pub previous_medications: Vec<PreviousMedication>,
    #[serde(deserialize_with = "nullable_list")]
    pub medicine_packages: Vec<MedicinePackage>,
    #[serde(deserialize_with = "nullable_list")]
    pub vaccination_records: Vec<VaccinationRecord>,
    #[serde(deserialize_with = "nullable_list")]
    pub upcoming_vaccinations: Vec<UpcomingVaccination>,
    #[serde(deserialize_with = "nullable_list")]
    pub recommended_vaccinations: Vec<RecommendedVaccination>,
    #[serde(deserialize_with = "nullable_list")]
    pub hospital_visits: Vec<HospitalVisit>,
    #[serde(deserialize_with = "nullable_list")]
    pub surgeries: Vec<Surgery>,
    #[serde(deserialize_with = "nullable_list")]
    pub health_reports: Vec<HealthReport>,
    #[serde(deserialize_with = "nullable_list")]
    pub family_details: Vec<FamilyMember>,

    pub insurance_coverage: Option<bool>,
    pub insurance_provider: Option<String>,
    pub insurance_policy_number: Option<String>,
    pub insurance_coverage_amount: Option<f64>,
    pub insurance_used: Option<f64>,
    pub insurance_valid_until: Option<String>,
    pub insurance_type: Option<String>,

    #[serde(deserialize_with = "nullable_list")]
    pub govt_schemes: Vec<GovtScheme>,
    #[serde(deserialize_with = "appointment_list")]
    pub appointments: Vec<Appointment>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactDetails {
    #[serde(deserialize_with = "loose_string")]
    pub phone: Option<String>,
    pub email: Option<String>,
    #[serde(deserialize_with = "loose_string")]
    pub emergency_contact: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Address {
    pub village: Option<String>,
    pub district: Option<String>,
    pub state: Option<String>,
    #[serde(deserialize_with = "loose_string")]
    pub pincode: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChronicCondition {
    pub name: Option<String>,
    pub diagnosed_date: Option<String>,
    pub severity: Option<String>,
    pub status: Option<String>,
    pub management_plan: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PastCondition {
    pub name: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub treatment: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Allergy {
    pub allergen: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub severity: Option<String>,
    pub reaction: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CurrentMedication {
    pub name: Option<String>,
    pub dosage: Option<String>,
    pub prescribed_by: Option<String>,
    pub schedule: Option<String>,
    pub next_refill_date: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PreviousMedication {
    pub name: Option<String>,
    pub dosage: Option<String>,
    pub prescribed_by: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub reason_for_stopping: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MedicinePackage {
    pub name: Option<String>,
    pub active: Option<bool>,
    pub monthly_cost: Option<f64>,
    pub next_delivery_date: Option<String>,
    pub supply_remaining: Option<f64>,
    #[serde(deserialize_with = "nullable_list")]
    pub medications: Vec<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VaccinationRecord {
    pub vaccine_name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub date: Option<String>,
    pub doctor_name: Option<String>,
    pub location: Option<String>,
    #[serde(deserialize_with = "loose_string")]
    pub batch_number: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpcomingVaccination {
    pub vaccine_name: Option<String>,
    pub due_date: Option<String>,
    pub free_under_govt_scheme: Option<bool>,
    pub notes: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecommendedVaccination {
    pub vaccine_name: Option<String>,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub free_under_govt_scheme: Option<bool>,
    pub warning: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HospitalVisit {
    pub hospital_name: Option<String>,
    pub hospital_type: Option<String>,
    pub date: Option<String>,
    pub doctor_name: Option<String>,
    pub specialization: Option<String>,
    pub diagnosis: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Surgery {
    pub name: Option<String>,
    pub date: Option<String>,
    pub hospital: Option<String>,
    pub surgeon: Option<String>,
    pub details: Option<String>,
    pub follow_up: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HealthReport {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub summary: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    #[serde(deserialize_with = "loose_string")]
    pub first_reading: Option<String>,
    #[serde(deserialize_with = "loose_string")]
    pub latest_reading: Option<String>,
    pub improvement: Option<bool>,
    #[serde(deserialize_with = "loose_string")]
    pub improvement_value: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FamilyMember {
    pub name: Option<String>,
    pub relationship: Option<String>,
    pub age: Option<f64>,
    pub covered_under_insurance: Option<bool>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GovtScheme {
    pub name: Option<String>,
    pub status: Option<String>,
    #[serde(deserialize_with = "loose_string")]
    pub card_number: Option<String>,
    pub valid_until: Option<String>,
    pub coverage_details: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Appointment {
    pub date: Option<String>,
    pub time: Option<String>,
    pub doctor_name: Option<String>,
    pub hospital_name: Option<String>,
    pub purpose: Option<String>,
}

impl HealthRecord {
    /// Decode a record from JSON text.
    ///
    /// Accepts the bare record or the `{ "success": .., "data": { .. } }`
    /// envelope returned by the data-access service. The rupee sign is
    /// rewritten to `Rs.` first since the standard fonts cannot encode it.
    pub fn from_json(text: &str) -> Result<Self, Error> {
        Self::from_value(serde_json::from_str(text)?)
    }

    /// Like [`HealthRecord::from_json`]; invalid UTF-8 is rejected rather
    /// than replaced.
    pub fn from_json_bytes(bytes: &[u8]) -> Result<Self, Error> {
        Self::from_value(serde_json::from_slice(bytes)?)
    }

    fn from_value(mut value: serde_json::Value) -> Result<Self, Error> {
        if let Some(data) = value.get_mut("data").filter(|d| d.is_object()) {
            value = data.take();
        }
        replace_rupee_sign(&mut value);
        Ok(serde_json::from_value(value)?)
    }

    /// The identifier used to name output files.
    pub fn record_id(&self) -> Option<&str> {
        self.object_id.as_deref().or(self.id.as_deref())
    }

    /// "First Last", skipping whichever half is missing.
    pub fn full_name(&self) -> Option<String> {
        let parts: Vec<&str> = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();
        (!parts.is_empty()).then(|| parts.join(" "))
    }
}

fn replace_rupee_sign(value: &mut serde_json::Value) {
    match value {
        serde_json::Value::String(s) if s.contains('\u{20B9}') => {
            *s = s.replace('\u{20B9}', "Rs.");
        }
        serde_json::Value::Array(items) => items.iter_mut().for_each(replace_rupee_sign),
        serde_json::Value::Object(map) => map.values_mut().for_each(replace_rupee_sign),
        _ => {}
    }
}

fn nullable_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Strings that upstream sometimes stores as numbers (pincodes, phone numbers).
fn loose_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }))
}

/// Plain string ids and extended-JSON `{ "$oid": ".." }` ids.
fn record_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Object(map) => map
            .get("$oid")
            .and_then(|oid| oid.as_str())
            .map(str::to_string),
        _ => None,
    }))
}

/// Appointments arrive either populated or as bare references; a bare
/// reference carries no displayable detail and becomes an empty entry.
fn appointment_list<'de, D>(deserializer: D) -> Result<Vec<Appointment>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Entry {
        Populated(Appointment),
        Reference(#[allow(dead_code)] serde_json::Value),
    }

    let entries = Option::<Vec<Entry>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(entries
        .into_iter()
        .map(|entry| match entry {
            Entry::Populated(appt) => appt,
            Entry::Reference(_) => Appointment::default(),
        })
        .collect())
}
