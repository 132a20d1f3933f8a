//! `ProfileDefinition`: the builder that replaces the original's
//! `ProfileMeta` class-attribute collection (§9 DESIGN NOTES). A concrete
//! profile is built by constructing one of these rather than subclassing;
//! `matches`/`get_actor` are attached as closures, mirroring
//! `original_source/scrywarden/profile/base.py`'s overridable methods.

use warden_core::{Message, ProfileError};

use crate::field::FieldDefinition;

type MatchesFn = Box<dyn Fn(&Message) -> bool + Send + Sync>;
type GetActorFn = Box<dyn Fn(&Message) -> Option<String> + Send + Sync>;

pub struct ProfileDefinition {
    pub name: String,
    fields: Vec<FieldDefinition>,
    matches: MatchesFn,
    get_actor: GetActorFn,
}

impl ProfileDefinition {
    pub fn new(
        name: impl Into<String>,
        matches: impl Fn(&Message) -> bool + Send + Sync + 'static,
        get_actor: impl Fn(&Message) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            matches: Box::new(matches),
            get_actor: Box::new(get_actor),
        }
    }

    /// Adds a field, rejecting a name collision the way `ProfileMeta`
    /// refused to build a class with two same-named fields.
    pub fn with_field(mut self, field: FieldDefinition) -> Result<Self, ProfileError> {
        if self.fields.iter().any(|existing| existing.name == field.name) {
            return Err(ProfileError::DuplicateField {
                profile: self.name.clone(),
                field: field.name,
            });
        }
        self.fields.push(field);
        Ok(self)
    }

    pub fn fields(&self) -> &[FieldDefinition] {
        &self.fields
    }

    pub fn matches(&self, message: &Message) -> bool {
        (self.matches)(message)
    }

    pub fn get_actor(&self, message: &Message) -> Option<String> {
        (self.get_actor)(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporters::Mandatory;

    #[test]
    fn rejects_a_duplicate_field_name() {
        let definition = ProfileDefinition::new("login", |_| true, |_| None)
            .with_field(FieldDefinition::single("greeting", Mandatory::default()))
            .unwrap();
        let err = definition
            .with_field(FieldDefinition::single("greeting", Mandatory::default()))
            .unwrap_err();
        assert!(matches!(err, ProfileError::DuplicateField { .. }));
    }
}
