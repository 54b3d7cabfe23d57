// `sqlx::migrate!` embeds the migration files at compile time, so editing
// one must rebuild the crate.
fn main() {
    println!("cargo:rerun-if-changed=migrations");
}
