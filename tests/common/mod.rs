#![allow(dead_code)]

use chrono::NaiveDate;
use serde_json::{Value, json};

use health_profile_pdf::{BlockKind, Document, HealthRecord, RenderOptions};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Options with a fixed generation date so output is reproducible.
pub fn options() -> RenderOptions {
    RenderOptions {
        generated_on: NaiveDate::from_ymd_opt(2024, 6, 9),
        ..RenderOptions::default()
    }
}

pub fn record(value: Value) -> HealthRecord {
    HealthRecord::from_json(&value.to_string()).expect("valid test record")
}

pub fn empty_record() -> HealthRecord {
    record(json!({}))
}

pub fn chronic_condition(i: usize) -> Value {
    let severity = ["High", "Moderate", "Low"][i % 3];
    json!({
        "name": format!("Condition {i}"),
        "diagnosedDate": "2019-04-12",
        "severity": severity,
        "status": "Active",
        "managementPlan": "Daily monitoring and lifestyle changes",
    })
}

pub fn with_chronic_conditions(n: usize) -> HealthRecord {
    let conditions: Vec<Value> = (0..n).map(chronic_condition).collect();
    record(json!({ "_id": "rec-chronic", "chronicConditions": conditions }))
}

/// A record with data in every section, wrapped in the service envelope.
pub fn full_record_json() -> Value {
    json!({
        "success": true,
        "data": {
            "_id": "65f0a1b2c3",
            "firstName": "Asha",
            "lastName": "Verma",
            "email": "asha@example.com",
            "gender": "Female",
            "age": 42,
            "dateOfBirth": "1982-02-14",
            "bloodGroup": "B+",
            "contactDetails": { "phone": 9876543210u64, "emergencyContact": "Ravi 9123456780" },
            "governmentId": "XXXX-1234",
            "address": { "village": "Kothur", "district": "Mahabubnagar", "state": "Telangana", "pincode": 509228 },
            "subscriptionPlan": "Gold",
            "subscriptionAmount": 1499,
            "subscriptionBenefits": ["Free teleconsultations", "Home sample collection"],
            "chronicConditions": [chronic_condition(0), chronic_condition(1)],
            "pastMedicalConditions": [
                { "name": "Typhoid", "startDate": "2015-06-01", "endDate": "2015-07-10", "treatment": "Antibiotics" }
            ],
            "allergies": [
                { "allergen": "Peanuts", "type": "Food", "severity": "High", "reaction": "Swelling of lips and throat, hives" }
            ],
            "currentMedications": [
                { "name": "Metformin", "dosage": "500mg", "prescribedBy": "Dr. Rao", "schedule": "Twice daily", "nextRefillDate": "2024-07-01" }
            ],
            "previousMedications": [
                { "name": "Glimepiride", "dosage": "1mg", "prescribedBy": "Dr. Rao", "startDate": "2020-01-01", "endDate": "2022-01-01", "reasonForStopping": "Hypoglycaemia" }
            ],
            "medicinePackages": [
                { "name": "Diabetes Care", "active": true, "monthlyCost": 1200, "nextDeliveryDate": "2024-06-20", "supplyRemaining": 12, "medications": ["Metformin", "Vitamin D3"] }
            ],
            "vaccinationRecords": [
                { "vaccineName": "Covishield", "type": "COVID-19", "date": "2021-05-04", "doctorName": "Dr. Iyer", "location": "PHC Kothur", "batchNumber": 4121 }
            ],
            "upcomingVaccinations": [
                { "vaccineName": "Tdap", "dueDate": "2024-09-01", "freeUnderGovtScheme": true }
            ],
            "recommendedVaccinations": [
                { "vaccineName": "Influenza", "description": "Annual flu shot for chronic patients", "priority": "High", "freeUnderGovtScheme": false, "warning": "Avoid if febrile" }
            ],
            "hospitalVisits": [
                { "hospitalName": "District Hospital", "hospitalType": "Government", "date": "2023-11-02", "doctorName": "Dr. Khan", "specialization": "Endocrinology", "diagnosis": "Uncontrolled blood sugar levels" }
            ],
            "surgeries": [
                { "name": "Appendectomy", "date": "2010-03-15", "hospital": "City Hospital", "surgeon": "Dr. Mehta", "details": "Laparoscopic removal", "followUp": "2010-04-01" }
            ],
            "healthReports": [
                { "type": "HbA1c", "summary": "Improving", "startDate": "2024-01-01", "endDate": "2024-03-31", "firstReading": 8.1, "latestReading": 7.2, "improvement": true, "improvementValue": "0.9" }
            ],
            "familyDetails": [
                { "name": "Ravi Verma", "relationship": "Spouse", "age": 45, "coveredUnderInsurance": true }
            ],
            "insuranceCoverage": true,
            "insuranceProvider": "Star Health",
            "insurancePolicyNumber": "SH-99812",
            "insuranceCoverageAmount": 500000,
            "insuranceUsed": 125000,
            "insuranceValidUntil": "2025-03-31",
            "insuranceType": "Family Floater",
            "govtSchemes": [
                { "name": "PMJAY", "status": "Active", "cardNumber": 11223344, "validUntil": "2026-01-01", "coverageDetails": "₹5 lakh per family per year" }
            ],
            "appointments": [
                { "date": "2024-06-15", "time": "10:30", "doctorName": "Dr. Rao", "purpose": "Quarterly review" },
                "65f0ffee"
            ]
        }
    })
}

pub fn full_record() -> HealthRecord {
    record(full_record_json())
}

pub fn count_in(doc: &Document, section: &str, pred: impl Fn(BlockKind) -> bool) -> usize {
    doc.blocks_in(section).filter(|b| pred(b.kind)).count()
}

pub fn is_row(kind: BlockKind) -> bool {
    matches!(kind, BlockKind::TableRow { .. })
}

pub fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}
