mod extract;
mod links;
mod pipeline;
