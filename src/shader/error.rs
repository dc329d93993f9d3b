use std::{error::Error, ops::Range};

use codespan_reporting::{
    diagnostic::{Diagnostic, Label},
    files::{Files, SimpleFile},
    term::{emit, Config},
};
use log::{error, warn};
use naga::{front::wgsl::ParseError, WithSpan};

use crate::shader::Preprocessor;

pub(crate) trait ToDiagnostic {
    fn to_diagnostic(&self, preprocessor: &Preprocessor) -> Vec<Diagnostic<usize>>;
}

impl ToDiagnostic for ParseError {
    fn to_diagnostic(&self, preprocessor: &Preprocessor) -> Vec<Diagnostic<usize>> {
        let labels = self
            .labels()
            .filter_map(|(span, message)| {
                let (fileid, range) = preprocessor.map_range(span.to_range()?)?;
                Some(Label::primary(fileid, range).with_message(message.to_string()))
            })
            .collect();

        vec![Diagnostic::error()
            .with_message(self.message().to_string())
            .with_labels(labels)]
    }
}

impl<E: Error> ToDiagnostic for WithSpan<E> {
    fn to_diagnostic(&self, preprocessor: &Preprocessor) -> Vec<Diagnostic<usize>> {
        let diagnostic = Diagnostic::error()
            .with_message(self.as_inner().to_string())
            .with_labels(
                self.spans()
                    .filter_map(|(span, desc)| {
                        let (fileid, range) = preprocessor.map_range(span.to_range()?)?;
                        Some(Label::primary(fileid, range).with_message(desc.to_owned()))
                    })
                    .collect(),
            )
            .with_notes({
                let mut notes = Vec::new();
                let mut source: &dyn Error = self.as_inner();
                while let Some(next) = Error::source(source) {
                    notes.push(next.to_string());
                    source = next;
                }
                notes
            });
        vec![diagnostic]
    }
}

/// Renders naga errors against the files the flattened source was built
/// from, logs them and hands the text back for the returned error.
pub(crate) trait Diagnose {
    fn diagnose(&self, preprocessor: &Preprocessor) -> String;
}

impl<T> Diagnose for T
where
    T: ToDiagnostic,
{
    fn diagnose(&self, preprocessor: &Preprocessor) -> String {
        let mut writer = termcolor::NoColor::new(Vec::new());
        let config = Config::default();

        for diagnostic in &self.to_diagnostic(preprocessor) {
            if let Err(emit_error) = emit(&mut writer, &config, preprocessor, diagnostic) {
                warn!("could not render shader diagnostic: {emit_error}");
            }
        }

        let result = String::from_utf8_lossy(&writer.into_inner()).into_owned();
        error!("{}", result);
        result
    }
}

impl<'a> Files<'a> for Preprocessor {
    type FileId = usize;
    type Name = &'a str;
    type Source = &'a str;

    fn name(&'a self, id: Self::FileId) -> Result<Self::Name, codespan_reporting::files::Error> {
        if id < self.files.len() {
            Ok(&self.files[id].filename)
        } else {
            Err(codespan_reporting::files::Error::FileMissing)
        }
    }

    fn source(
        &'a self,
        id: Self::FileId,
    ) -> Result<Self::Source, codespan_reporting::files::Error> {
        if id < self.files.len() {
            Ok(&self.files[id].content)
        } else {
            Err(codespan_reporting::files::Error::FileMissing)
        }
    }

    fn line_index(
        &self,
        id: Self::FileId,
        byte_index: usize,
    ) -> Result<usize, codespan_reporting::files::Error> {
        if id < self.files.len() {
            let file = SimpleFile::new(&self.files[id].filename, &self.files[id].content);
            file.line_index((), byte_index)
        } else {
            Err(codespan_reporting::files::Error::FileMissing)
        }
    }

    fn line_range(
        &self,
        id: Self::FileId,
        line_index: usize,
    ) -> Result<Range<usize>, codespan_reporting::files::Error> {
        if id < self.files.len() {
            let file = SimpleFile::new(&self.files[id].filename, &self.files[id].content);
            file.line_range((), line_index)
        } else {
            Err(codespan_reporting::files::Error::FileMissing)
        }
    }
}
