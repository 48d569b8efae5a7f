mod common;
mod comparables;
