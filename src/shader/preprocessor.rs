use std::ops::Range;

use crate::{shader::Shader, HexShadeError};

pub(crate) struct PreprocessedFile {
    pub filename: String,
    pub content: String,
    /// Byte offset of this file inside the flattened source
    pub offset: usize,
}

impl PreprocessedFile {
    fn range(&self) -> Range<usize> {
        self.offset..self.offset + self.content.len()
    }
}

struct Flattener<'a> {
    shader: &'a str,
    files: Vec<PreprocessedFile>,
    // Files whose lines are currently being expanded. Guards against include cycles
    active: Vec<String>,
}

impl Flattener<'_> {
    fn preprocess_line(&mut self, line: &str) -> Result<String, HexShadeError> {
        let filename_pattern: &[char] = &[' ', '"', '\'', '<', '>'];
        let Some(include) = line.trim_start().strip_prefix("#include") else {
            return Ok(line.to_string());
        };

        let include = include.trim_matches(filename_pattern);
        let already_processed = self.files.iter().any(|file| file.filename == include)
            || self.active.iter().any(|filename| filename == include);
        if !already_processed {
            let file = Shader::get(include).ok_or_else(|| HexShadeError::ShaderInclude {
                shader: self.shader.to_string(),
                include: include.to_string(),
            })?;
            self.preprocess(&file.data, include)?;
        }

        Ok(format!("// {line}"))
    }

    fn preprocess(&mut self, data: &[u8], filename: &str) -> Result<(), HexShadeError> {
        let content =
            std::str::from_utf8(data).map_err(|error| HexShadeError::ShaderCompilation {
                name: self.shader.to_string(),
                diagnostics: format!("{filename} is not valid utf-8: {error}"),
            })?;

        self.active.push(filename.to_string());
        let mut lines = Vec::new();
        for line in content.lines() {
            lines.push(self.preprocess_line(line)?);
        }
        self.active.pop();

        let mut content = lines.join("\n");
        content.push('\n');

        let offset = self
            .files
            .last()
            .map(|file| file.offset + file.content.len())
            .unwrap_or(0);
        self.files.push(PreprocessedFile {
            filename: filename.to_string(),
            content,
            offset,
        });
        Ok(())
    }
}

/// Flattens `#include` directives into one source. Included files come before
/// the file that includes them and every file appears at most once.
pub(crate) struct Preprocessor {
    pub content: String,
    pub files: Vec<PreprocessedFile>,
}

impl Preprocessor {
    pub fn new(data: &[u8], filename: &str) -> Result<Self, HexShadeError> {
        let mut flattener = Flattener {
            shader: filename,
            files: Vec::new(),
            active: Vec::new(),
        };
        flattener.preprocess(data, filename)?;

        let files = flattener.files;
        let content = files
            .iter()
            .map(|file| file.content.as_str())
            .collect::<Vec<&str>>()
            .join("");

        Ok(Self { content, files })
    }

    /// Maps a byte offset of the flattened source to the file it came from
    /// and the offset inside that file.
    pub fn get_file_and_start(&self, start: usize) -> Option<(usize, usize)> {
        self.files
            .iter()
            .position(|file| file.range().contains(&start))
            .map(|index| (index, start - self.files[index].offset))
    }

    /// Maps a span of the flattened source. Spans crossing a file boundary are
    /// cut at the end of the file they start in.
    pub fn map_range(&self, range: Range<usize>) -> Option<(usize, Range<usize>)> {
        let (index, start) = self.get_file_and_start(range.start)?;
        let file = &self.files[index];
        let end = range.end.min(file.offset + file.content.len()) - file.offset;
        Some((index, start..end.max(start)))
    }
}
