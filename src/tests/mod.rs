mod util;

mod monotone;
mod negative;
mod triangulate;
