//! The fixed section catalogue and the assembler that walks it.
//!
//! Every section is first turned into [`SectionContent`] (pure data shaping,
//! the only step that can fail) and then drawn with the block renderers.

use crate::error::Error;
use crate::model::HealthRecord;

use super::blocks::{bullet_line, key_value_row, notice, section_gap, section_header};
use super::card::{BulletList, Card, CardLine, StatusBadge, render_card};
use super::cursor::Layout;
use super::surface::{Color, palette};
use super::table::{CellMarker, Column, Table, render_table};
use super::text::{
    NOT_AVAILABLE, format_amount, format_date, format_number, or_na, required, yes_no,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SectionKind {
    Personal,
    Address,
    Subscription,
    ChronicConditions,
    PastConditions,
    Allergies,
    CurrentMedications,
    PreviousMedications,
    MedicinePackages,
    VaccinationRecords,
    UpcomingVaccinations,
    RecommendedVaccinations,
    HospitalVisits,
    Surgeries,
    HealthReports,
    Family,
    Insurance,
    GovtSchemes,
    Appointments,
}

/// How a section's data is drawn when it has any.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderStrategy {
    KeyValue,
    Table,
    CardList,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SectionDescriptor {
    pub kind: SectionKind,
    pub title: &'static str,
    pub strategy: RenderStrategy,
    /// Message of the notice row drawn when the section has no data.
    pub empty_notice: &'static str,
}

const fn section(
    kind: SectionKind,
    title: &'static str,
    strategy: RenderStrategy,
    empty_notice: &'static str,
) -> SectionDescriptor {
    SectionDescriptor {
        kind,
        title,
        strategy,
        empty_notice,
    }
}

/// Sections in drawing order. The order is part of the output contract and
/// matches the declaration order of [`SectionKind`].
pub static CATALOGUE: [SectionDescriptor; 19] = {
    use RenderStrategy as R;
    use SectionKind as K;
    [
        section(K::Personal, "Personal Information", R::KeyValue, "No personal details recorded."),
        section(K::Address, "Address", R::KeyValue, "No address recorded."),
        section(K::Subscription, "Subscription Details", R::KeyValue, "No subscription details recorded."),
        section(K::ChronicConditions, "Chronic Conditions", R::Table, "No chronic conditions recorded."),
        section(K::PastConditions, "Past Medical Conditions", R::Table, "No past medical conditions recorded."),
        section(K::Allergies, "Allergies", R::Table, "No allergies recorded."),
        section(K::CurrentMedications, "Current Medications", R::Table, "No current medications recorded."),
        section(K::PreviousMedications, "Previous Medications", R::Table, "No previous medications recorded."),
        section(K::MedicinePackages, "Medicine Packages", R::CardList, "No medicine packages recorded."),
        section(K::VaccinationRecords, "Vaccination Records", R::Table, "No vaccination records available."),
        section(K::UpcomingVaccinations, "Upcoming Vaccinations", R::Table, "No upcoming vaccinations scheduled."),
        section(K::RecommendedVaccinations, "Recommended Vaccinations", R::Table, "No recommended vaccinations."),
        section(K::HospitalVisits, "Hospital Visits", R::Table, "No hospital visits recorded."),
        section(K::Surgeries, "Surgeries", R::Table, "No surgeries recorded."),
        section(K::HealthReports, "Health Reports", R::Table, "No health reports available."),
        section(K::Family, "Family Details", R::Table, "No family details recorded."),
        section(K::Insurance, "Insurance Information", R::CardList, "No insurance coverage recorded."),
        section(K::GovtSchemes, "Government Schemes", R::Table, "No government schemes recorded."),
        section(K::Appointments, "Upcoming Appointments", R::Table, "No upcoming appointments."),
    ]
};

pub fn descriptor(kind: SectionKind) -> &'static SectionDescriptor {
    &CATALOGUE[kind as usize]
}

#[derive(Clone, Debug, PartialEq)]
pub enum KvItem {
    Row { label: &'static str, value: String },
    Bullet(String),
}

/// A section's data, shaped for one of the block renderers.
#[derive(Clone, Debug, PartialEq)]
pub enum SectionContent {
    KeyValues(Vec<KvItem>),
    Table(Table),
    Cards(Vec<Card>),
    Empty(&'static str),
}

impl SectionContent {
    /// Whether this content is what a section drawn with `strategy` produces.
    pub fn fits(&self, strategy: RenderStrategy) -> bool {
        matches!(
            (self, strategy),
            (SectionContent::KeyValues(_), RenderStrategy::KeyValue)
                | (SectionContent::Table(_), RenderStrategy::Table)
                | (SectionContent::Cards(_), RenderStrategy::CardList)
                | (SectionContent::Empty(_), _)
        )
    }
}

/// Marker colour for a chronic condition's severity.
pub fn severity_color(severity: &str) -> Color {
    match severity.to_ascii_lowercase().as_str() {
        "high" | "severe" => palette::RED,
        "medium" | "moderate" => palette::ORANGE,
        _ => palette::GREEN,
    }
}

/// Meter colour for the share of insurance coverage still available.
pub fn coverage_color(remaining_percent: f64) -> Color {
    if remaining_percent < 20.0 {
        palette::RED
    } else if remaining_percent < 50.0 {
        palette::ORANGE
    } else {
        palette::TEAL
    }
}

fn rupees(amount: Option<f64>) -> String {
    match amount {
        Some(a) => format!("Rs. {}", format_amount(a)),
        None => NOT_AVAILABLE.to_string(),
    }
}

fn row(label: &'static str, value: impl Into<String>) -> KvItem {
    KvItem::Row {
        label,
        value: value.into(),
    }
}

fn key_values(items: Vec<KvItem>, empty: &'static str) -> SectionContent {
    if items.is_empty() {
        SectionContent::Empty(empty)
    } else {
        SectionContent::KeyValues(items)
    }
}

/// Shape one section of `record`. Fails only when a list entry lacks a
/// field the renderer has to dereference.
pub fn build(kind: SectionKind, record: &HealthRecord) -> Result<SectionContent, Error> {
    let desc = descriptor(kind);
    let title = desc.title;
    let empty = desc.empty_notice;

    let content = match kind {
        SectionKind::Personal => {
            let contact = record.contact_details.as_ref();
            let mut items = Vec::new();
            if let Some(name) = record.full_name() {
                items.push(row("Name", name));
            }
            if let Some(age) = record.age {
                items.push(row("Age", format_number(age)));
            }
            if let Some(gender) = &record.gender {
                items.push(row("Gender", gender.as_str()));
            }
            if let Some(group) = &record.blood_group {
                items.push(row("Blood Group", group.as_str()));
            }
            if record.date_of_birth.is_some() {
                items.push(row("Date of Birth", format_date(record.date_of_birth.as_deref())));
            }
            if let Some(email) = record
                .email
                .as_deref()
                .or_else(|| contact.and_then(|c| c.email.as_deref()))
            {
                items.push(row("Email", email));
            }
            if let Some(phone) = contact.and_then(|c| c.phone.as_deref()) {
                items.push(row("Phone", phone));
            }
            if let Some(emergency) = contact.and_then(|c| c.emergency_contact.as_deref()) {
                items.push(row("Emergency Contact", emergency));
            }
            if let Some(gov_id) = &record.government_id {
                items.push(row("Government ID", gov_id.as_str()));
            }
            key_values(items, empty)
        }
        SectionKind::Address => {
            let items: Vec<KvItem> = record
                .address
                .as_ref()
                .map(|a| {
                    [
                        ("Village", &a.village),
                        ("District", &a.district),
                        ("State", &a.state),
                        ("Pincode", &a.pincode),
                    ]
                    .into_iter()
                    .filter_map(|(label, v)| v.as_deref().map(|v| row(label, v)))
                    .collect()
                })
                .unwrap_or_default();
            key_values(items, empty)
        }
        SectionKind::Subscription => {
            let mut items = Vec::new();
            if let Some(plan) = &record.subscription_plan {
                items.push(row("Plan", plan.as_str()));
            }
            if let Some(amount) = record.subscription_amount {
                items.push(row("Amount", rupees(Some(amount))));
            }
            if !record.subscription_benefits.is_empty() {
                items.push(row("Benefits", ""));
                items.extend(record.subscription_benefits.iter().cloned().map(KvItem::Bullet));
            }
            key_values(items, empty)
        }
        SectionKind::ChronicConditions => {
            let mut table = Table::new(vec![
                Column::new("Condition"),
                Column::new("Diagnosed Date"),
                Column::new("Severity"),
                Column::new("Status"),
                Column::truncated("Management", 20),
            ]);
            for c in &record.chronic_conditions {
                let severity = required(c.severity.as_deref(), title, "severity")?;
                let plan = required(c.management_plan.as_deref(), title, "managementPlan")?;
                table
                    .push_row(vec![
                        or_na(c.name.as_deref()),
                        format_date(c.diagnosed_date.as_deref()),
                        format!("\u{2022} {severity}"),
                        or_na(c.status.as_deref()),
                        plan.to_string(),
                    ])
                    .marker = Some(CellMarker {
                    column: 2,
                    color: severity_color(severity),
                });
            }
            SectionContent::Table(table)
        }
        SectionKind::PastConditions => {
            let mut table = Table::new(vec![
                Column::new("Condition"),
                Column::new("Start Date"),
                Column::new("End Date"),
                Column::new("Treatment"),
            ]);
            for c in &record.past_medical_conditions {
                table.push_row(vec![
                    or_na(c.name.as_deref()),
                    format_date(c.start_date.as_deref()),
                    format_date(c.end_date.as_deref()),
                    or_na(c.treatment.as_deref()),
                ]);
            }
            SectionContent::Table(table)
        }
        SectionKind::Allergies => {
            let mut table = Table::new(vec![
                Column::new("Allergen"),
                Column::new("Type"),
                Column::new("Severity"),
                Column::truncated("Reaction", 25),
            ]);
            for a in &record.allergies {
                let reaction = required(a.reaction.as_deref(), title, "reaction")?;
                table.push_row(vec![
                    or_na(a.allergen.as_deref()),
                    or_na(a.kind.as_deref()),
                    or_na(a.severity.as_deref()),
                    reaction.to_string(),
                ]);
            }
            SectionContent::Table(table)
        }
        SectionKind::CurrentMedications => {
            let mut table = Table::new(vec![
                Column::new("Medication"),
                Column::new("Dosage"),
                Column::new("Prescribed By"),
                Column::new("Schedule"),
                Column::new("Next Refill"),
            ]);
            for m in &record.current_medications {
                table.push_row(vec![
                    or_na(m.name.as_deref()),
                    or_na(m.dosage.as_deref()),
                    or_na(m.prescribed_by.as_deref()),
                    or_na(m.schedule.as_deref()),
                    format_date(m.next_refill_date.as_deref()),
                ]);
            }
            SectionContent::Table(table)
        }
        SectionKind::PreviousMedications => {
            let mut table = Table::new(vec![
                Column::new("Medication"),
                Column::new("Dosage"),
                Column::new("Prescribed By"),
                Column::new("Start Date"),
                Column::new("End Date"),
                Column::new("Reason for Stopping"),
            ]);
            for m in &record.previous_medications {
                table.push_row(vec![
                    or_na(m.name.as_deref()),
                    or_na(m.dosage.as_deref()),
                    or_na(m.prescribed_by.as_deref()),
                    format_date(m.start_date.as_deref()),
                    format_date(m.end_date.as_deref()),
                    or_na(m.reason_for_stopping.as_deref()),
                ]);
            }
            SectionContent::Table(table)
        }
        SectionKind::MedicinePackages => SectionContent::Cards(
            record
                .medicine_packages
                .iter()
                .map(|pkg| {
                    let active = pkg.active.unwrap_or(false);
                    let mut card = Card::new(or_na(pkg.name.as_deref()));
                    card.status = Some(StatusBadge {
                        label: if active { "Active" } else { "Inactive" }.to_string(),
                        color: if active { palette::TEAL } else { palette::MUTED_GRAY },
                    });
                    card.lines = vec![
                        CardLine::field("Monthly Cost", rupees(pkg.monthly_cost)),
                        CardLine::field(
                            "Next Delivery",
                            format_date(pkg.next_delivery_date.as_deref()),
                        ),
                        CardLine::field(
                            "Supply Remaining",
                            match pkg.supply_remaining {
                                Some(days) => format!("{} days", format_number(days)),
                                None => NOT_AVAILABLE.to_string(),
                            },
                        ),
                    ];
                    card.list = Some(BulletList {
                        heading: "Medications",
                        items: pkg.medications.clone(),
                    });
                    card
                })
                .collect(),
        ),
        SectionKind::VaccinationRecords => {
            let mut table = Table::new(vec![
                Column::new("Vaccine"),
                Column::new("Type"),
                Column::new("Date"),
                Column::new("Doctor"),
                Column::new("Location"),
                Column::new("Batch #"),
            ]);
            for v in &record.vaccination_records {
                table.push_row(vec![
                    or_na(v.vaccine_name.as_deref()),
                    or_na(v.kind.as_deref()),
                    format_date(v.date.as_deref()),
                    or_na(v.doctor_name.as_deref()),
                    or_na(v.location.as_deref()),
                    or_na(v.batch_number.as_deref()),
                ]);
            }
            SectionContent::Table(table)
        }
        SectionKind::UpcomingVaccinations => {
            let mut table = Table::new(vec![
                Column::new("Vaccine"),
                Column::new("Due Date"),
                Column::new("Free Under Govt Scheme"),
                Column::new("Notes"),
            ]);
            for v in &record.upcoming_vaccinations {
                table.push_row(vec![
                    or_na(v.vaccine_name.as_deref()),
                    format_date(v.due_date.as_deref()),
                    yes_no(v.free_under_govt_scheme).to_string(),
                    v.notes.clone().unwrap_or_default(),
                ]);
            }
            SectionContent::Table(table)
        }
        SectionKind::RecommendedVaccinations => {
            let mut table = Table::new(vec![
                Column::new("Vaccine"),
                Column::truncated("Description", 20),
                Column::new("Priority"),
                Column::new("Free Under Govt Scheme"),
                Column::new("Warning"),
            ]);
            for v in &record.recommended_vaccinations {
                let description = required(v.description.as_deref(), title, "description")?;
                table.push_row(vec![
                    or_na(v.vaccine_name.as_deref()),
                    description.to_string(),
                    or_na(v.priority.as_deref()),
                    yes_no(v.free_under_govt_scheme).to_string(),
                    v.warning.clone().unwrap_or_default(),
                ]);
            }
            SectionContent::Table(table)
        }
        SectionKind::HospitalVisits => {
            let mut table = Table::new(vec![
                Column::new("Hospital"),
                Column::new("Type"),
                Column::new("Date"),
                Column::new("Doctor"),
                Column::new("Specialization"),
                Column::truncated("Diagnosis", 20),
            ]);
            for v in &record.hospital_visits {
                let diagnosis = required(v.diagnosis.as_deref(), title, "diagnosis")?;
                table.push_row(vec![
                    or_na(v.hospital_name.as_deref()),
                    or_na(v.hospital_type.as_deref()),
                    format_date(v.date.as_deref()),
                    or_na(v.doctor_name.as_deref()),
                    or_na(v.specialization.as_deref()),
                    diagnosis.to_string(),
                ]);
            }
            SectionContent::Table(table)
        }
        SectionKind::Surgeries => {
            let mut table = Table::new(vec![
                Column::new("Surgery"),
                Column::new("Date"),
                Column::new("Hospital"),
                Column::new("Surgeon"),
                Column::truncated("Details", 15),
                Column::new("Follow-up"),
            ]);
            for s in &record.surgeries {
                let details = required(s.details.as_deref(), title, "details")?;
                table.push_row(vec![
                    or_na(s.name.as_deref()),
                    format_date(s.date.as_deref()),
                    or_na(s.hospital.as_deref()),
                    or_na(s.surgeon.as_deref()),
                    details.to_string(),
                    format_date(s.follow_up.as_deref()),
                ]);
            }
            SectionContent::Table(table)
        }
        SectionKind::HealthReports => {
            let mut table = Table::new(vec![
                Column::new("Type"),
                Column::new("Summary"),
                Column::new("Period"),
                Column::new("First Reading"),
                Column::new("Latest Reading"),
                Column::new("Improvement"),
            ]);
            for r in &record.health_reports {
                let period = format!(
                    "{} - {}",
                    format_date(r.start_date.as_deref()),
                    format_date(r.end_date.as_deref())
                );
                let improvement = if r.improvement.unwrap_or(false) {
                    format!("Yes ({})", or_na(r.improvement_value.as_deref()))
                } else {
                    "No".to_string()
                };
                table.push_row(vec![
                    or_na(r.kind.as_deref()),
                    or_na(r.summary.as_deref()),
                    period,
                    or_na(r.first_reading.as_deref()),
                    or_na(r.latest_reading.as_deref()),
                    improvement,
                ]);
            }
            SectionContent::Table(table)
        }
        SectionKind::Family => {
            let mut table = Table::new(vec![
                Column::new("Name"),
                Column::new("Relationship"),
                Column::new("Age"),
                Column::new("Covered Under Insurance"),
            ]);
            for f in &record.family_details {
                let age = required(f.age.as_ref(), title, "age")?;
                table.push_row(vec![
                    or_na(f.name.as_deref()),
                    or_na(f.relationship.as_deref()),
                    format_number(*age),
                    yes_no(f.covered_under_insurance).to_string(),
                ]);
            }
            SectionContent::Table(table)
        }
        SectionKind::Insurance => {
            if record.insurance_coverage != Some(true) {
                return Ok(SectionContent::Empty(empty));
            }
            SectionContent::Cards(vec![insurance_card(record)?])
        }
        SectionKind::GovtSchemes => {
            let mut table = Table::new(vec![
                Column::new("Scheme"),
                Column::new("Status"),
                Column::new("Card Number"),
                Column::new("Valid Until"),
                Column::truncated("Coverage", 20),
            ]);
            for s in &record.govt_schemes {
                let coverage = required(s.coverage_details.as_deref(), title, "coverageDetails")?;
                table.push_row(vec![
                    or_na(s.name.as_deref()),
                    or_na(s.status.as_deref()),
                    or_na(s.card_number.as_deref()),
                    format_date(s.valid_until.as_deref()),
                    coverage.to_string(),
                ]);
            }
            SectionContent::Table(table)
        }
        SectionKind::Appointments => {
            let mut table = Table::new(vec![
                Column::new("Date"),
                Column::new("Time"),
                Column::new("Doctor"),
                Column::new("Hospital"),
                Column::new("Purpose"),
            ]);
            for a in &record.appointments {
                table.push_row(vec![
                    format_date(a.date.as_deref()),
                    or_na(a.time.as_deref()),
                    or_na(a.doctor_name.as_deref()),
                    or_na(a.hospital_name.as_deref()),
                    or_na(a.purpose.as_deref()),
                ]);
            }
            SectionContent::Table(table)
        }
    };

    debug_assert!(
        content.fits(desc.strategy),
        "{title} shaped as {content:?}, declared {:?}",
        desc.strategy
    );
    Ok(match content {
        SectionContent::Table(t) if t.is_empty() => SectionContent::Empty(empty),
        SectionContent::Cards(c) if c.is_empty() => SectionContent::Empty(empty),
        other => other,
    })
}

/// Share of the insured amount still available, in percent.
pub fn remaining_percent(coverage: f64, used: f64) -> f64 {
    if coverage <= 0.0 {
        return 0.0;
    }
    (100.0 - used / coverage * 100.0).clamp(0.0, 100.0)
}

fn insurance_card(record: &HealthRecord) -> Result<Card, Error> {
    const TITLE: &str = "Insurance Information";
    let coverage = *required(record.insurance_coverage_amount.as_ref(), TITLE, "insuranceCoverageAmount")?;
    let used = *required(record.insurance_used.as_ref(), TITLE, "insuranceUsed")?;
    let remaining = remaining_percent(coverage, used);
    let color = coverage_color(remaining);

    let mut card = Card::new("Insurance Card");
    card.border_opacity = 0.5;
    card.status = Some(StatusBadge {
        label: format!("{}% remaining", remaining.round()),
        color,
    });
    card.lines = vec![
        CardLine::bold_field("Provider", or_na(record.insurance_provider.as_deref())),
        CardLine::field("Policy Number", or_na(record.insurance_policy_number.as_deref())),
        CardLine::field("Type", or_na(record.insurance_type.as_deref())),
        CardLine::field("Coverage", rupees(Some(coverage))),
        CardLine::field("Used", rupees(Some(used))),
        CardLine::Meter {
            label: "Usage",
            fraction: (1.0 - remaining / 100.0) as f32,
            color,
        },
        CardLine::field("Valid Until", format_date(record.insurance_valid_until.as_deref())),
    ];
    Ok(card)
}

/// Draw one section: header, then content or its notice, then the gap.
pub fn render_section(layout: &mut Layout, desc: &SectionDescriptor, content: &SectionContent) {
    section_header(layout, desc.title);
    log::debug!(
        "SECTION '{}' page={} y={:.2}",
        desc.title,
        layout.cursor().page + 1,
        layout.y()
    );
    match content {
        SectionContent::KeyValues(items) => {
            let mut row_index = 0;
            for item in items {
                match item {
                    KvItem::Row { label, value } => {
                        key_value_row(layout, label, value, row_index);
                        row_index += 1;
                    }
                    KvItem::Bullet(text) => {
                        bullet_line(layout, text);
                    }
                }
            }
        }
        SectionContent::Table(table) => {
            render_table(layout, table);
        }
        SectionContent::Cards(cards) => {
            for card in cards {
                render_card(layout, card);
            }
        }
        SectionContent::Empty(message) => {
            notice(layout, message);
        }
    }
    section_gap(layout);
}

/// Walk the catalogue in order. All sections are shaped before anything is
/// drawn, so a malformed entry aborts without partial pages.
pub fn assemble(layout: &mut Layout, record: &HealthRecord) -> Result<(), Error> {
    let contents = CATALOGUE
        .iter()
        .map(|d| build(d.kind, record))
        .collect::<Result<Vec<_>, _>>()?;
    for (desc, content) in CATALOGUE.iter().zip(&contents) {
        render_section(layout, desc, content);
    }
    layout.end_section();
    Ok(())
}
