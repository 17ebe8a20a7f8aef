pub mod dom_cache;
