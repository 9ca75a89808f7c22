//! Incident and vehicle side panels: create/edit forms, list rows and the
//! name filter. Pure state; the network side lives in `actions`.

use control_room_core::{
    Incident, IncidentDraft, IncidentStatus, Location, Vehicle, VehicleDraft,
};
use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Incident,
    Vehicle,
}

impl RecordKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Incident => "incident",
            Self::Vehicle => "vehicle",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Name,
    Status,
    Location,
    Submit,
}

/// Cursor shared by both panels: list selection, form focus and filter text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PanelNav {
    pub selected: usize,
    pub form_active: bool,
    pub field_index: usize,
    pub filter: String,
    pub filtering: bool,
}

impl PanelNav {
    pub fn select_next(&mut self, rows: usize) {
        if rows > 0 && self.selected + 1 < rows {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn clamp(&mut self, rows: usize) {
        self.selected = self.selected.min(rows.saturating_sub(1));
    }

    pub fn open_form(&mut self) {
        self.form_active = true;
        self.field_index = 0;
    }

    pub fn close_form(&mut self) {
        self.form_active = false;
    }

    pub fn next_field(&mut self, fields: usize) {
        if fields > 0 {
            self.field_index = (self.field_index + 1) % fields;
        }
    }

    pub fn prev_field(&mut self, fields: usize) {
        if fields > 0 {
            self.field_index = (self.field_index + fields - 1) % fields;
        }
    }
}

/// Fuzzy name match; an empty query matches everything.
pub fn name_matches(name: &str, query: &str) -> bool {
    let query = query.trim();
    if query.is_empty() {
        return true;
    }
    SkimMatcherV2::default().fuzzy_match(name, query).is_some()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Pending,
    Resolved,
}

impl Section {
    pub const fn title(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Resolved => "Resolved",
        }
    }

    const fn status(self) -> IncidentStatus {
        match self {
            Self::Pending => IncidentStatus::Pending,
            Self::Resolved => IncidentStatus::Resolved,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncidentRow {
    Header { section: Section, count: usize },
    /// Index into the incident list.
    Item(usize),
    Empty(Section),
}

#[derive(Debug, Clone, PartialEq)]
pub struct IncidentPanel {
    pub create: IncidentDraft,
    pub create_error: Option<String>,
    pub editing: Option<i64>,
    pub edit: IncidentDraft,
    pub edit_error: Option<String>,
    pub show_pending: bool,
    pub show_resolved: bool,
    pub nav: PanelNav,
}

impl Default for IncidentPanel {
    fn default() -> Self {
        Self {
            create: IncidentDraft::default(),
            create_error: None,
            editing: None,
            edit: IncidentDraft::default(),
            edit_error: None,
            show_pending: true,
            show_resolved: true,
            nav: PanelNav::default(),
        }
    }
}

impl IncidentPanel {
    pub const fn fields(&self) -> &'static [FormField] {
        if self.editing.is_some() {
            &[
                FormField::Name,
                FormField::Status,
                FormField::Location,
                FormField::Submit,
            ]
        } else {
            &[FormField::Name, FormField::Location, FormField::Submit]
        }
    }

    pub fn field(&self) -> FormField {
        let fields = self.fields();
        fields[self.nav.field_index.min(fields.len() - 1)]
    }

    /// The draft the form currently edits.
    pub fn draft_mut(&mut self) -> &mut IncidentDraft {
        if self.editing.is_some() {
            &mut self.edit
        } else {
            &mut self.create
        }
    }

    pub const fn draft(&self) -> &IncidentDraft {
        if self.editing.is_some() {
            &self.edit
        } else {
            &self.create
        }
    }

    pub fn error_mut(&mut self) -> &mut Option<String> {
        if self.editing.is_some() {
            &mut self.edit_error
        } else {
            &mut self.create_error
        }
    }

    pub fn start_edit(&mut self, incident: &Incident) {
        self.editing = Some(incident.id);
        self.edit = IncidentDraft::from_incident(incident);
        self.edit_error = None;
        self.nav.open_form();
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
        self.edit_error = None;
        self.nav.close_form();
    }

    /// A map pick lands in the edit form while editing, else in the create form.
    pub fn take_location(&mut self, location: Location) {
        self.draft_mut().location = location;
    }

    pub fn reset_create(&mut self) {
        self.create = IncidentDraft::default();
        self.create_error = None;
    }

    pub fn toggle_section(&mut self, section: Section) {
        match section {
            Section::Pending => self.show_pending = !self.show_pending,
            Section::Resolved => self.show_resolved = !self.show_resolved,
        }
    }

    const fn expanded(&self, section: Section) -> bool {
        match section {
            Section::Pending => self.show_pending,
            Section::Resolved => self.show_resolved,
        }
    }

    /// Rows of the list: one header per section, then the matching incidents
    /// while the section is expanded.
    pub fn rows(&self, incidents: &[Incident]) -> Vec<IncidentRow> {
        let mut rows = Vec::new();
        for section in [Section::Pending, Section::Resolved] {
            let members: Vec<usize> = incidents
                .iter()
                .enumerate()
                .filter(|(_, incident)| incident.status == section.status())
                .filter(|(_, incident)| name_matches(&incident.name, &self.nav.filter))
                .map(|(index, _)| index)
                .collect();

            rows.push(IncidentRow::Header {
                section,
                count: members.len(),
            });
            if !self.expanded(section) {
                continue;
            }
            if members.is_empty() {
                rows.push(IncidentRow::Empty(section));
            } else {
                rows.extend(members.into_iter().map(IncidentRow::Item));
            }
        }
        rows
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct VehiclePanel {
    pub create: VehicleDraft,
    pub create_error: Option<String>,
    pub editing: Option<i64>,
    pub edit: VehicleDraft,
    pub edit_error: Option<String>,
    /// Outcome of the last create: `Created vehicle id: N` or `Failed: ...`.
    pub last_message: String,
    pub nav: PanelNav,
}

impl VehiclePanel {
    pub const fn fields(&self) -> &'static [FormField] {
        &[FormField::Name, FormField::Location, FormField::Submit]
    }

    pub fn field(&self) -> FormField {
        let fields = self.fields();
        fields[self.nav.field_index.min(fields.len() - 1)]
    }

    pub fn draft_mut(&mut self) -> &mut VehicleDraft {
        if self.editing.is_some() {
            &mut self.edit
        } else {
            &mut self.create
        }
    }

    pub const fn draft(&self) -> &VehicleDraft {
        if self.editing.is_some() {
            &self.edit
        } else {
            &self.create
        }
    }

    pub fn error_mut(&mut self) -> &mut Option<String> {
        if self.editing.is_some() {
            &mut self.edit_error
        } else {
            &mut self.create_error
        }
    }

    pub fn start_edit(&mut self, vehicle: &Vehicle) {
        self.editing = Some(vehicle.id);
        self.edit = VehicleDraft::from_vehicle(vehicle);
        self.edit_error = None;
        self.nav.open_form();
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
        self.edit_error = None;
        self.nav.close_form();
    }

    pub fn take_location(&mut self, location: Location) {
        self.draft_mut().location = location;
    }

    pub fn reset_create(&mut self) {
        self.create = VehicleDraft::default();
        self.create_error = None;
    }

    /// Indices of the vehicles that pass the filter.
    pub fn rows(&self, vehicles: &[Vehicle]) -> Vec<usize> {
        vehicles
            .iter()
            .enumerate()
            .filter(|(_, vehicle)| name_matches(&vehicle.name, &self.nav.filter))
            .map(|(index, _)| index)
            .collect()
    }
}
