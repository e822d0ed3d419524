//! Recursive-descent parser: turns a token stream into an [`IdlFile`].

#[cfg(test)]
mod tests;

use crate::ast::*;
use crate::lexer::{LexError, Lexer};
use crate::token::{Token, TokenKind};
use std::fmt;

pub struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Parser<'a> {
    /// Lexes and parses a complete IDL file.
    pub fn parse_str(src: &str) -> Result<IdlFile, ParseError> {
        let tokens = Lexer::tokenize(src)?;
        let mut parser = Parser { tokens: &tokens, pos: 0 };
        parser.parse_file()
    }

    fn kind(&self) -> &TokenKind {
        &self.tokens[self.pos].kind
    }

    fn line(&self) -> u32 {
        self.tokens[self.pos].line
    }

    fn peek_is(&self, kind: &TokenKind) -> bool {
        self.kind() == kind
    }

    fn bump(&mut self) -> &Token {
        let tok = &self.tokens[self.pos];
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.peek_is(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<(), ParseError> {
        if *self.kind() == kind {
            self.bump();
            Ok(())
        } else {
            Err(self.unexpected(&format!("expected {kind}")))
        }
    }

    fn expect_ident(&mut self) -> Result<String, ParseError> {
        match self.kind().clone() {
            TokenKind::Ident(name) => {
                self.bump();
                Ok(name)
            }
            _ => Err(self.unexpected("expected an identifier")),
        }
    }

    /// Parses a constant/label/array-size/vector-bound expression. This
    /// grammar only ever needs the expression's literal text (either a
    /// reference to a previously declared `const`, or an integer literal);
    /// the resolver and emitters re-emit it verbatim rather than evaluating
    /// it, matching spec.md §3's "value expression" fields.
    fn parse_expr_text(&mut self) -> Result<String, ParseError> {
        match self.kind().clone() {
            TokenKind::Ident(name) => {
                self.bump();
                Ok(name)
            }
            TokenKind::Int { text, .. } => {
                self.bump();
                Ok(text)
            }
            _ => Err(self.unexpected("expected a constant or integer literal")),
        }
    }

    fn unexpected(&self, what: &str) -> ParseError {
        ParseError::new(self.line(), format!("{what}, found {}", self.kind()))
    }

    fn parse_file(&mut self) -> Result<IdlFile, ParseError> {
        let mut idl = IdlFile::default();
        loop {
            match self.kind() {
                TokenKind::Eof => break,
                TokenKind::KwConst => idl.consts.push(self.parse_const()?),
                TokenKind::KwEnum => idl.enums.push(self.parse_enum()?),
                TokenKind::KwTypedef => idl.typedefs.push(self.parse_typedef()?),
                TokenKind::KwStruct => idl.structs.push(self.parse_struct(false)?),
                TokenKind::KwLinkedlist => {
                    self.bump();
                    idl.structs.push(self.parse_struct(true)?);
                }
                TokenKind::KwUnion => idl.unions.push(self.parse_union(false)?),
                TokenKind::KwOpaque => {
                    self.bump();
                    idl.unions.push(self.parse_union(true)?);
                }
                TokenKind::KwProgram => idl.programs.push(self.parse_program()?),
                _ => return Err(self.unexpected("expected a top-level declaration")),
            }
        }
        Ok(idl)
    }

    fn parse_const(&mut self) -> Result<ConstDecl, ParseError> {
        self.expect(TokenKind::KwConst)?;
        let name = self.expect_ident()?;
        self.expect(TokenKind::Eq)?;
        let value = self.parse_expr_text()?;
        self.expect(TokenKind::Semi)?;
        Ok(ConstDecl { name, value })
    }

    fn parse_enum(&mut self) -> Result<EnumDecl, ParseError> {
        self.expect(TokenKind::KwEnum)?;
        let name = self.expect_ident()?;
        self.expect(TokenKind::LBrace)?;
        let mut entries = Vec::new();
        loop {
            let ename = self.expect_ident()?;
            self.expect(TokenKind::Eq)?;
            let value = self.parse_expr_text()?;
            entries.push(EnumEntry { name: ename, value });
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RBrace)?;
        self.expect(TokenKind::Semi)?;
        Ok(EnumDecl { name, entries })
    }

    fn parse_typedef(&mut self) -> Result<TypedefDecl, ParseError> {
        self.expect(TokenKind::KwTypedef)?;
        let member = self.parse_member()?;
        self.expect(TokenKind::Semi)?;
        Ok(TypedefDecl {
            name: member.name,
            ty: member.ty,
        })
    }

    fn parse_struct(&mut self, linkedlist: bool) -> Result<StructDecl, ParseError> {
        self.expect(TokenKind::KwStruct)?;
        let name = self.expect_ident()?;
        self.expect(TokenKind::LBrace)?;
        let mut members = Vec::new();
        while !self.peek_is(&TokenKind::RBrace) {
            let m = self.parse_member()?;
            self.expect(TokenKind::Semi)?;
            members.push(m);
        }
        self.expect(TokenKind::RBrace)?;
        self.expect(TokenKind::Semi)?;
        Ok(StructDecl {
            name,
            linkedlist,
            members,
        })
    }

    fn parse_union(&mut self, opaque: bool) -> Result<UnionDecl, ParseError> {
        self.expect(TokenKind::KwUnion)?;
        let name = self.expect_ident()?;
        self.expect(TokenKind::KwSwitch)?;
        self.expect(TokenKind::LParen)?;
        let pivot = self.parse_member()?;
        self.expect(TokenKind::RParen)?;
        self.expect(TokenKind::LBrace)?;

        let mut cases = Vec::new();
        let mut default_case = None;
        loop {
            match self.kind() {
                TokenKind::KwCase => {
                    self.bump();
                    let label = self.parse_expr_text()?;
                    self.expect(TokenKind::Colon)?;
                    cases.push(self.parse_case_arm(label)?);
                }
                TokenKind::KwDefault => {
                    self.bump();
                    self.expect(TokenKind::Colon)?;
                    default_case = Some(self.parse_case_arm(String::new())?);
                }
                TokenKind::RBrace => break,
                _ => return Err(self.unexpected("expected 'case', 'default' or '}'")),
            }
        }
        self.expect(TokenKind::RBrace)?;
        self.expect(TokenKind::Semi)?;

        Ok(UnionDecl {
            name,
            opaque,
            pivot,
            cases,
            default_case,
        })
    }

    fn parse_case_arm(&mut self, label: String) -> Result<UnionCase, ParseError> {
        if self.eat(&TokenKind::KwVoid) {
            self.expect(TokenKind::Semi)?;
            Ok(UnionCase {
                label,
                body: None,
                voided: true,
            })
        } else {
            let body = self.parse_member()?;
            self.expect(TokenKind::Semi)?;
            Ok(UnionCase {
                label,
                body: Some(body),
                voided: false,
            })
        }
    }

    fn parse_program(&mut self) -> Result<Program, ParseError> {
        self.expect(TokenKind::KwProgram)?;
        let name = self.expect_ident()?;
        self.expect(TokenKind::LBrace)?;
        let mut versions = Vec::new();
        while self.peek_is(&TokenKind::KwVersion) {
            versions.push(self.parse_version()?);
        }
        self.expect(TokenKind::RBrace)?;
        self.expect(TokenKind::Eq)?;
        let id = self.parse_expr_text()?;
        self.expect(TokenKind::Semi)?;
        Ok(Program { id, name, versions })
    }

    fn parse_version(&mut self) -> Result<Version, ParseError> {
        self.expect(TokenKind::KwVersion)?;
        let name = self.expect_ident()?;
        self.expect(TokenKind::LBrace)?;
        let mut functions = Vec::new();
        while !self.peek_is(&TokenKind::RBrace) {
            functions.push(self.parse_function()?);
        }
        self.expect(TokenKind::RBrace)?;
        self.expect(TokenKind::Eq)?;
        let id = self.parse_expr_text()?;
        self.expect(TokenKind::Semi)?;
        Ok(Version { id, name, functions })
    }

    fn parse_function(&mut self) -> Result<Function, ParseError> {
        let reply_type = self.parse_base_type_only()?;
        let name = self.expect_ident()?;
        self.expect(TokenKind::LParen)?;
        let call_type = self.parse_base_type_only()?;
        self.expect(TokenKind::RParen)?;
        self.expect(TokenKind::Eq)?;
        let id = self.parse_expr_text()?;
        self.expect(TokenKind::Semi)?;
        Ok(Function {
            id,
            name,
            call_type,
            reply_type,
        })
    }

    /// Parses a member declaration: a base type followed by a declarator
    /// shape (`name`, `*name`, `name[N]`, or `name<N?>`).
    fn parse_member(&mut self) -> Result<Member, ParseError> {
        let (name, builtin, flags) = self.parse_base_type()?;

        if self.eat(&TokenKind::Star) {
            let member_name = self.expect_ident()?;
            return Ok(Member {
                ty: TypeDescriptor {
                    name,
                    builtin,
                    flags: flags | TypeFlags::OPTIONAL,
                    vector: false,
                    vector_bound: None,
                    array: false,
                    array_size: None,
                },
                name: member_name,
            });
        }

        let member_name = self.expect_ident()?;

        if self.eat(&TokenKind::LBracket) {
            let size = self.parse_expr_text()?;
            self.expect(TokenKind::RBracket)?;
            return Ok(Member {
                ty: TypeDescriptor {
                    name,
                    builtin,
                    flags,
                    vector: false,
                    vector_bound: None,
                    array: true,
                    array_size: Some(size),
                },
                name: member_name,
            });
        }

        if self.eat(&TokenKind::LAngle) {
            let bound = if self.peek_is(&TokenKind::RAngle) {
                None
            } else {
                Some(self.parse_expr_text()?)
            };
            self.expect(TokenKind::RAngle)?;
            return Ok(Member {
                ty: TypeDescriptor {
                    name,
                    builtin,
                    flags,
                    vector: true,
                    vector_bound: bound,
                    array: false,
                    array_size: None,
                },
                name: member_name,
            });
        }

        Ok(Member {
            ty: TypeDescriptor {
                name,
                builtin,
                flags,
                vector: false,
                vector_bound: None,
                array: false,
                array_size: None,
            },
            name: member_name,
        })
    }

    /// Parses a bare type reference with no declarator — used for a
    /// function's call/reply type, which names a type but not a field.
    fn parse_base_type_only(&mut self) -> Result<TypeDescriptor, ParseError> {
        let (name, builtin, flags) = self.parse_base_type()?;
        Ok(TypeDescriptor {
            name,
            builtin,
            flags,
            vector: false,
            vector_bound: None,
            array: false,
            array_size: None,
        })
    }

    fn parse_base_type(&mut self) -> Result<(String, bool, TypeFlags), ParseError> {
        let mut flags = TypeFlags::empty();
        if self.eat(&TokenKind::KwZerocopy) {
            flags |= TypeFlags::ZEROCOPY;
        }

        let (name, builtin) = match self.kind().clone() {
            TokenKind::KwVoid => {
                self.bump();
                ("void".to_string(), true)
            }
            TokenKind::KwBool => {
                self.bump();
                ("bool".to_string(), true)
            }
            TokenKind::KwOpaque => {
                self.bump();
                flags |= TypeFlags::OPAQUE;
                ("xdr_opaque".to_string(), true)
            }
            TokenKind::KwString => {
                self.bump();
                ("xdr_string".to_string(), true)
            }
            TokenKind::KwUnsigned => {
                self.bump();
                match self.kind() {
                    TokenKind::KwInt => {
                        self.bump();
                        ("uint32".to_string(), true)
                    }
                    TokenKind::KwHyper => {
                        self.bump();
                        ("uint64".to_string(), true)
                    }
                    _ => return Err(self.unexpected("expected 'int' or 'hyper' after 'unsigned'")),
                }
            }
            TokenKind::KwInt => {
                self.bump();
                ("int32".to_string(), true)
            }
            TokenKind::KwHyper => {
                self.bump();
                ("int64".to_string(), true)
            }
            TokenKind::KwFloat => {
                self.bump();
                ("float32".to_string(), true)
            }
            TokenKind::KwDouble => {
                self.bump();
                ("float64".to_string(), true)
            }
            TokenKind::Ident(name) => {
                self.bump();
                let builtin = is_builtin_name(&name);
                (name, builtin)
            }
            _ => return Err(self.unexpected("expected a type")),
        };

        if flags.contains(TypeFlags::ZEROCOPY) && !flags.contains(TypeFlags::OPAQUE) {
            return Err(ParseError::new(
                self.line(),
                "'zerocopy' is only valid on an 'opaque' field".to_string(),
            ));
        }

        Ok((name, builtin, flags))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseError {
    pub line: u32,
    pub message: String,
}

impl ParseError {
    pub fn new(line: u32, message: String) -> Self {
        tracing::debug!(line, %message, "parse error");
        Self { line, message }
    }
}

impl From<LexError> for ParseError {
    fn from(e: LexError) -> Self {
        ParseError {
            line: e.line,
            message: e.message,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

impl std::error::Error for ParseError {}
