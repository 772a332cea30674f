//! End-to-end resolution tests over Squirrel source text.

#[cfg(test)]
mod utils;

#[cfg(test)]
mod resolution;

#[cfg(test)]
mod members;

#[cfg(test)]
mod documentation;

#[cfg(test)]
mod units;
