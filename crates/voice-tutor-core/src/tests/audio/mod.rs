mod capture;
mod recognizer;
