pub mod changeset_reporter;

pub use changeset_reporter::ChangesetReporter;
