pub mod web_context;

#[cfg(test)]
mod tests;

pub use web_context::WebContext;
