//# Browsing state built on top of the catalog client
pub mod collection;
pub mod fetch;
pub mod resources;
pub mod wantlist;
