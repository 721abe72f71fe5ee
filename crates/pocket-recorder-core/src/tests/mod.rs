mod recording;
mod support;
