mod supabase;

pub use supabase::{SupabaseApi, SupabaseConfig};
